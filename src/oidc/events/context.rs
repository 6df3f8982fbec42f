use std::ops::ControlFlow;
use std::sync::Arc;

use hyper::http::request::Parts;
use serde_json::Value;

use crate::authentication::{AuthenticationProperties, AuthenticationTicket, ClaimsPrincipal};
use crate::oidc::message::{OpenIdConnectMessage, TokenResponse};
use crate::oidc::options::OpenIdConnectOptions;
use crate::Error;

/// How the flow continues after a callback returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventState {
    #[default]
    Continue,
    /// The application wrote the response; `ticket` is the outcome.
    HandledResponse,
    /// Stop processing this request with no result.
    Skipped,
}

/// Data shared by every event context.
#[derive(Debug)]
pub struct BaseControlContext {
    request: Arc<Parts>,
    options: Arc<OpenIdConnectOptions>,
    state: EventState,
    pub ticket: Option<AuthenticationTicket>,
}

impl BaseControlContext {
    pub fn new(request: Arc<Parts>, options: Arc<OpenIdConnectOptions>) -> Self {
        Self {
            request,
            options,
            state: EventState::Continue,
            ticket: None,
        }
    }

    pub fn request(&self) -> &Parts {
        &self.request
    }

    pub fn options(&self) -> &OpenIdConnectOptions {
        &self.options
    }

    pub fn state(&self) -> EventState {
        self.state
    }

    pub fn handle_response(&mut self) {
        self.state = EventState::HandledResponse;
    }

    pub fn skip_to_next_middleware(&mut self) {
        self.state = EventState::Skipped;
    }

    pub fn is_handled_response(&self) -> bool {
        self.state == EventState::HandledResponse
    }

    pub fn is_skipped(&self) -> bool {
        self.state == EventState::Skipped
    }

    pub(crate) fn control_flow(&mut self) -> ControlFlow<Option<AuthenticationTicket>> {
        match self.state {
            EventState::Continue => ControlFlow::Continue(()),
            EventState::HandledResponse => ControlFlow::Break(self.ticket.take()),
            EventState::Skipped => ControlFlow::Break(None),
        }
    }
}

#[derive(Debug)]
pub struct MessageReceivedContext {
    pub base: BaseControlContext,
    pub protocol_message: OpenIdConnectMessage,
}

#[derive(Debug)]
pub struct AuthorizationCodeReceivedContext {
    pub base: BaseControlContext,
    pub code: String,
    pub protocol_message: OpenIdConnectMessage,
    pub redirect_uri: String,
    /// Principal from an id token delivered with the code, if any.
    pub principal: Option<ClaimsPrincipal>,
    /// Set by a callback that redeems the code itself.
    pub token_response: Option<TokenResponse>,
}

impl AuthorizationCodeReceivedContext {
    pub fn handle_code_redemption(&mut self, token_response: TokenResponse) {
        self.token_response = Some(token_response);
    }
}

#[derive(Debug)]
pub struct AuthorizationCodeRedeemedContext {
    pub base: BaseControlContext,
    pub code: String,
    pub token_response: TokenResponse,
}

#[derive(Debug)]
pub struct IdTokenReceivedContext {
    pub base: BaseControlContext,
    pub id_token: String,
    pub protocol_message: OpenIdConnectMessage,
}

#[derive(Debug)]
pub struct IdTokenValidatedContext {
    pub base: BaseControlContext,
    pub principal: ClaimsPrincipal,
    pub protocol_message: OpenIdConnectMessage,
}

#[derive(Debug)]
pub struct UserInformationReceivedContext {
    pub base: BaseControlContext,
    pub user: Value,
    pub principal: ClaimsPrincipal,
    pub protocol_message: OpenIdConnectMessage,
}

#[derive(Debug)]
pub struct RedirectContext {
    pub base: BaseControlContext,
    pub protocol_message: OpenIdConnectMessage,
    pub properties: AuthenticationProperties,
}

#[derive(Debug)]
pub struct AuthenticationCompletedContext {
    pub base: BaseControlContext,
}

#[derive(Debug)]
pub struct AuthenticationFailedContext {
    pub base: BaseControlContext,
    pub error: Error,
    pub protocol_message: Option<OpenIdConnectMessage>,
}

#[cfg(test)]
mod tests {
    use hyper::Request;

    use super::*;

    fn base() -> BaseControlContext {
        let (parts, ()) = Request::builder().body(()).unwrap().into_parts();
        BaseControlContext::new(Arc::new(parts), Arc::new(OpenIdConnectOptions::default()))
    }

    #[test]
    fn test_default_state_continues() {
        let mut base = base();
        assert_eq!(base.state(), EventState::Continue);
        assert!(!base.is_handled_response());
        assert!(!base.is_skipped());
        assert_eq!(base.control_flow(), ControlFlow::Continue(()));
    }

    #[test]
    fn test_handled_response_breaks_with_ticket() {
        let mut base = base();
        base.ticket = Some(AuthenticationTicket::default());
        base.handle_response();

        assert!(base.is_handled_response());
        assert_eq!(
            base.control_flow(),
            ControlFlow::Break(Some(AuthenticationTicket::default()))
        );
    }

    #[test]
    fn test_skip_breaks_without_ticket() {
        let mut base = base();
        base.ticket = Some(AuthenticationTicket::default());
        base.skip_to_next_middleware();

        assert!(base.is_skipped());
        assert_eq!(base.control_flow(), ControlFlow::Break(None));
    }

    #[test]
    fn test_code_redemption_by_callback() {
        let mut context = AuthorizationCodeReceivedContext {
            base: base(),
            code: "code-1".to_string(),
            protocol_message: OpenIdConnectMessage::default(),
            redirect_uri: "https://app.example.com/signin-oidc".to_string(),
            principal: None,
            token_response: None,
        };

        context.handle_code_redemption(TokenResponse {
            access_token: Some("at".to_string()),
            ..TokenResponse::default()
        });

        assert_eq!(
            context
                .token_response
                .and_then(|response| response.access_token),
            Some("at".to_string())
        );
    }
}
