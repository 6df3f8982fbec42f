//! Lifecycle callbacks fired by the OpenID Connect handler.
//!
//! Every callback receives a mutable, single-use context for its point of the
//! flow and completes before the flow continues. Applications either implement
//! [`OidcEvents`] directly, overriding only the points they care about, or set
//! closures on an [`OpenIdConnectEvents`] registry:
//!
//! ```rust,ignore
//! use oidc_relying_party::oidc::OpenIdConnectEvents;
//!
//! let mut events = OpenIdConnectEvents::default();
//! events.on_id_token_received(|context| {
//!     Box::pin(async move {
//!         context.id_token = context.id_token.trim().to_string();
//!         Ok(())
//!     })
//! });
//! ```
//!
//! Errors returned by a callback reach the caller unchanged.

mod context;
mod lifecycle;
mod registry;

use std::fmt::Debug;

use async_trait::async_trait;

pub use context::{
    AuthenticationCompletedContext, AuthenticationFailedContext,
    AuthorizationCodeReceivedContext, AuthorizationCodeRedeemedContext, BaseControlContext,
    EventState, IdTokenReceivedContext, IdTokenValidatedContext, MessageReceivedContext,
    RedirectContext, UserInformationReceivedContext,
};
pub use lifecycle::LifecyclePoint;
pub use registry::{EventCallback, EventResult, OpenIdConnectEvents};

use crate::Error;

/// Callbacks invoked by the OpenID Connect handler. Every method defaults to a
/// completed no-op.
#[async_trait]
pub trait OidcEvents: Debug + Send + Sync {
    /// Invoked when a protocol message is first received.
    async fn message_received(&self, _context: &mut MessageReceivedContext) -> Result<(), Error> {
        Ok(())
    }

    /// Invoked when the protocol message carries an authorization code.
    async fn authorization_code_received(
        &self,
        _context: &mut AuthorizationCodeReceivedContext,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Invoked after the authorization code is redeemed at the token endpoint.
    async fn authorization_code_redeemed(
        &self,
        _context: &mut AuthorizationCodeRedeemedContext,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Invoked with the id token before it is validated.
    async fn id_token_received(&self, _context: &mut IdTokenReceivedContext) -> Result<(), Error> {
        Ok(())
    }

    /// Invoked after the id token passed validation.
    async fn id_token_validated(
        &self,
        _context: &mut IdTokenValidatedContext,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Invoked with the document returned by the userinfo endpoint.
    async fn user_information_received(
        &self,
        _context: &mut UserInformationReceivedContext,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Invoked before redirecting to the identity provider to authenticate.
    async fn redirect_to_authentication_endpoint(
        &self,
        _context: &mut RedirectContext,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Invoked before redirecting to the identity provider to sign out.
    async fn redirect_to_end_session_endpoint(
        &self,
        _context: &mut RedirectContext,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Invoked when the authentication process completes.
    async fn authentication_completed(
        &self,
        _context: &mut AuthenticationCompletedContext,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Invoked when processing the authorization response fails. The error is
    /// returned afterwards unless the callback handled or skipped the request.
    async fn authentication_failed(
        &self,
        _context: &mut AuthenticationFailedContext,
    ) -> Result<(), Error> {
        Ok(())
    }
}
