use async_trait::async_trait;
use hyper::http::request::Parts;
use serde_json::Value;

use super::message::{OpenIdConnectMessage, TokenResponse};
use super::options::OpenIdConnectOptions;
use crate::authentication::{AuthenticationProperties, ClaimsPrincipal};
use crate::Error;

/// Wire-level OpenID Connect operations used by
/// [`OpenIdConnectHandler`](super::OpenIdConnectHandler).
///
/// Implementations own message parsing, token validation and the provider's
/// HTTP endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OidcProtocol: Send + Sync {
    /// Extracts the authorization response carried by `request`.
    ///
    /// Returns:
    /// - `Ok(Some(message))` if the request is a callback from the provider
    /// - `Ok(None)` if the request carries no authorization response
    /// - `Err(Error)` if the response is present but malformed
    async fn read_message(
        &self,
        request: &Parts,
        options: &OpenIdConnectOptions,
    ) -> Result<Option<OpenIdConnectMessage>, Error>;

    async fn redeem_code(
        &self,
        code: &str,
        redirect_uri: &str,
        options: &OpenIdConnectOptions,
    ) -> Result<TokenResponse, Error>;

    /// Validates the token and maps it to a principal.
    async fn validate_id_token(
        &self,
        id_token: &str,
        options: &OpenIdConnectOptions,
    ) -> Result<ClaimsPrincipal, Error>;

    /// Fetches the userinfo document.
    async fn user_information(
        &self,
        access_token: &str,
        options: &OpenIdConnectOptions,
    ) -> Result<Value, Error>;

    async fn authentication_request(
        &self,
        redirect_uri: &str,
        properties: &AuthenticationProperties,
        options: &OpenIdConnectOptions,
    ) -> Result<OpenIdConnectMessage, Error>;

    async fn end_session_request(
        &self,
        properties: &AuthenticationProperties,
        options: &OpenIdConnectOptions,
    ) -> Result<OpenIdConnectMessage, Error>;
}
