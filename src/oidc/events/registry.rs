use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::{self, BoxFuture};

use super::context::{
    AuthenticationCompletedContext, AuthenticationFailedContext,
    AuthorizationCodeReceivedContext, AuthorizationCodeRedeemedContext, IdTokenReceivedContext,
    IdTokenValidatedContext, MessageReceivedContext, RedirectContext,
    UserInformationReceivedContext,
};
use super::OidcEvents;
use crate::Error;

pub type EventResult<'a> = BoxFuture<'a, Result<(), Error>>;

pub type EventCallback<C> = Arc<dyn for<'a> Fn(&'a mut C) -> EventResult<'a> + Send + Sync>;

fn completed<C>(_context: &mut C) -> EventResult<'_> {
    Box::pin(future::ready(Ok(())))
}

fn noop<C: 'static>() -> EventCallback<C> {
    Arc::new(completed::<C>)
}

/// Registry of closures, one slot per lifecycle point.
///
/// Slots are configured at startup; unset slots complete immediately.
#[derive(Clone)]
pub struct OpenIdConnectEvents {
    on_message_received: EventCallback<MessageReceivedContext>,
    on_authorization_code_received: EventCallback<AuthorizationCodeReceivedContext>,
    on_authorization_code_redeemed: EventCallback<AuthorizationCodeRedeemedContext>,
    on_id_token_received: EventCallback<IdTokenReceivedContext>,
    on_id_token_validated: EventCallback<IdTokenValidatedContext>,
    on_user_information_received: EventCallback<UserInformationReceivedContext>,
    on_redirect_to_authentication_endpoint: EventCallback<RedirectContext>,
    on_redirect_to_end_session_endpoint: EventCallback<RedirectContext>,
    on_authentication_completed: EventCallback<AuthenticationCompletedContext>,
    on_authentication_failed: EventCallback<AuthenticationFailedContext>,
}

impl Default for OpenIdConnectEvents {
    fn default() -> Self {
        Self {
            on_message_received: noop(),
            on_authorization_code_received: noop(),
            on_authorization_code_redeemed: noop(),
            on_id_token_received: noop(),
            on_id_token_validated: noop(),
            on_user_information_received: noop(),
            on_redirect_to_authentication_endpoint: noop(),
            on_redirect_to_end_session_endpoint: noop(),
            on_authentication_completed: noop(),
            on_authentication_failed: noop(),
        }
    }
}

impl fmt::Debug for OpenIdConnectEvents {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OpenIdConnectEvents").finish_non_exhaustive()
    }
}

impl OpenIdConnectEvents {
    pub fn on_message_received<F>(&mut self, callback: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut MessageReceivedContext) -> EventResult<'a> + Send + Sync + 'static,
    {
        self.on_message_received = Arc::new(callback);
        self
    }

    pub fn on_authorization_code_received<F>(&mut self, callback: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut AuthorizationCodeReceivedContext) -> EventResult<'a>
            + Send
            + Sync
            + 'static,
    {
        self.on_authorization_code_received = Arc::new(callback);
        self
    }

    pub fn on_authorization_code_redeemed<F>(&mut self, callback: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut AuthorizationCodeRedeemedContext) -> EventResult<'a>
            + Send
            + Sync
            + 'static,
    {
        self.on_authorization_code_redeemed = Arc::new(callback);
        self
    }

    pub fn on_id_token_received<F>(&mut self, callback: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut IdTokenReceivedContext) -> EventResult<'a> + Send + Sync + 'static,
    {
        self.on_id_token_received = Arc::new(callback);
        self
    }

    pub fn on_id_token_validated<F>(&mut self, callback: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut IdTokenValidatedContext) -> EventResult<'a> + Send + Sync + 'static,
    {
        self.on_id_token_validated = Arc::new(callback);
        self
    }

    pub fn on_user_information_received<F>(&mut self, callback: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut UserInformationReceivedContext) -> EventResult<'a>
            + Send
            + Sync
            + 'static,
    {
        self.on_user_information_received = Arc::new(callback);
        self
    }

    pub fn on_redirect_to_authentication_endpoint<F>(&mut self, callback: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RedirectContext) -> EventResult<'a> + Send + Sync + 'static,
    {
        self.on_redirect_to_authentication_endpoint = Arc::new(callback);
        self
    }

    pub fn on_redirect_to_end_session_endpoint<F>(&mut self, callback: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RedirectContext) -> EventResult<'a> + Send + Sync + 'static,
    {
        self.on_redirect_to_end_session_endpoint = Arc::new(callback);
        self
    }

    pub fn on_authentication_completed<F>(&mut self, callback: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut AuthenticationCompletedContext) -> EventResult<'a>
            + Send
            + Sync
            + 'static,
    {
        self.on_authentication_completed = Arc::new(callback);
        self
    }

    pub fn on_authentication_failed<F>(&mut self, callback: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut AuthenticationFailedContext) -> EventResult<'a>
            + Send
            + Sync
            + 'static,
    {
        self.on_authentication_failed = Arc::new(callback);
        self
    }
}

#[async_trait]
impl OidcEvents for OpenIdConnectEvents {
    async fn message_received(&self, context: &mut MessageReceivedContext) -> Result<(), Error> {
        (self.on_message_received)(context).await
    }

    async fn authorization_code_received(
        &self,
        context: &mut AuthorizationCodeReceivedContext,
    ) -> Result<(), Error> {
        (self.on_authorization_code_received)(context).await
    }

    async fn authorization_code_redeemed(
        &self,
        context: &mut AuthorizationCodeRedeemedContext,
    ) -> Result<(), Error> {
        (self.on_authorization_code_redeemed)(context).await
    }

    async fn id_token_received(&self, context: &mut IdTokenReceivedContext) -> Result<(), Error> {
        (self.on_id_token_received)(context).await
    }

    async fn id_token_validated(&self, context: &mut IdTokenValidatedContext) -> Result<(), Error> {
        (self.on_id_token_validated)(context).await
    }

    async fn user_information_received(
        &self,
        context: &mut UserInformationReceivedContext,
    ) -> Result<(), Error> {
        (self.on_user_information_received)(context).await
    }

    async fn redirect_to_authentication_endpoint(
        &self,
        context: &mut RedirectContext,
    ) -> Result<(), Error> {
        (self.on_redirect_to_authentication_endpoint)(context).await
    }

    async fn redirect_to_end_session_endpoint(
        &self,
        context: &mut RedirectContext,
    ) -> Result<(), Error> {
        (self.on_redirect_to_end_session_endpoint)(context).await
    }

    async fn authentication_completed(
        &self,
        context: &mut AuthenticationCompletedContext,
    ) -> Result<(), Error> {
        (self.on_authentication_completed)(context).await
    }

    async fn authentication_failed(
        &self,
        context: &mut AuthenticationFailedContext,
    ) -> Result<(), Error> {
        (self.on_authentication_failed)(context).await
    }
}
