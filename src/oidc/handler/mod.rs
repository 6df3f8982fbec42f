
use std::ops::ControlFlow;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use hyper::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::events::{
    AuthenticationCompletedContext, AuthenticationFailedContext,
    AuthorizationCodeReceivedContext, AuthorizationCodeRedeemedContext, BaseControlContext,
    EventState, IdTokenReceivedContext, IdTokenValidatedContext, LifecyclePoint,
    MessageReceivedContext, RedirectContext, UserInformationReceivedContext,
};
use super::message::{OpenIdConnectMessage, TokenResponse};
use super::options::OpenIdConnectOptions;
use super::protocol::OidcProtocol;
use crate::authentication::{
    AuthenticationProperties, AuthenticationTicket, ClaimsPrincipal, HandlerBehavior,
    HandlerContext, HandlerResponse,
};
use crate::Error;

type Context = HandlerContext<OpenIdConnectOptions>;

/// Result of a step that callbacks may end early.
type Step<T> = Result<ControlFlow<Option<AuthenticationTicket>, T>, Error>;

const TOKEN_PREFIX: &str = ".Token.";

/// Drives the OpenID Connect authorization response through the lifecycle
/// callbacks of [`OpenIdConnectOptions::events`].
pub struct OpenIdConnectHandler {
    protocol: Arc<dyn OidcProtocol>,
}

impl OpenIdConnectHandler {
    pub fn new(protocol: Arc<dyn OidcProtocol>) -> Self {
        Self { protocol }
    }

    fn base(context: &Context) -> BaseControlContext {
        BaseControlContext::new(context.request().clone(), context.options().clone())
    }

    async fn process_message(
        &self,
        context: &Context,
        message: &mut OpenIdConnectMessage,
    ) -> Result<Option<AuthenticationTicket>, Error> {
        let options = context.options();

        let mut received = MessageReceivedContext {
            base: Self::base(context),
            protocol_message: std::mem::take(message),
        };
        debug!(event = %LifecyclePoint::MessageReceived, "Invoking event");
        let invoked = options.events.message_received(&mut received).await;
        *message = received.protocol_message;
        invoked?;
        if let ControlFlow::Break(outcome) = received.base.control_flow() {
            return Ok(outcome);
        }
        let message = &*message;

        if let Some(error) = message.error() {
            let msg = match message.error_description() {
                Some(description) => format!("{error}: {description}"),
                None => error.to_string(),
            };
            return Err(Error::Protocol(msg));
        }

        let mut principal = None;
        if let Some(id_token) = message.id_token() {
            match self
                .receive_id_token(context, id_token.to_string(), message)
                .await?
            {
                ControlFlow::Continue(validated) => principal = Some(validated),
                ControlFlow::Break(outcome) => return Ok(outcome),
            }
        }

        let mut token_response = None;
        if let Some(code) = message.code() {
            let redeemed = match self
                .receive_code(context, code.to_string(), message, principal.clone())
                .await?
            {
                ControlFlow::Continue(redeemed) => redeemed,
                ControlFlow::Break(outcome) => return Ok(outcome),
            };

            if principal.is_none() {
                let Some(id_token) = redeemed.id_token.clone() else {
                    return Err(Error::Protocol(
                        "token endpoint response contains no id_token".to_string(),
                    ));
                };

                match self.receive_id_token(context, id_token, message).await? {
                    ControlFlow::Continue(validated) => principal = Some(validated),
                    ControlFlow::Break(outcome) => return Ok(outcome),
                }
            }

            token_response = Some(redeemed);
        }

        let Some(mut principal) = principal else {
            return Err(Error::Protocol(
                "authorization response contains neither code nor id_token".to_string(),
            ));
        };

        if options.get_claims_from_user_info_endpoint {
            match self
                .receive_user_information(context, principal, token_response.as_ref(), message)
                .await?
            {
                ControlFlow::Continue(merged) => principal = merged,
                ControlFlow::Break(outcome) => return Ok(outcome),
            }
        }

        let mut properties = AuthenticationProperties {
            issued_utc: Some(Utc::now()),
            ..AuthenticationProperties::default()
        };
        if let Some(expires_in) = token_response
            .as_ref()
            .and_then(|response| response.expires_in)
            .and_then(|seconds| i64::try_from(seconds).ok())
            .and_then(Duration::try_seconds)
        {
            properties.expires_utc = Utc::now().checked_add_signed(expires_in);
            if properties.expires_utc.is_none() {
                debug!("Ignoring out of range token lifetime");
            }
        }
        if options.save_tokens {
            save_tokens(&mut properties, token_response.as_ref(), message);
        }

        if let Some(issuer) = &options.authentication.claims_issuer {
            principal
                .claims
                .entry("iss".to_string())
                .or_insert_with(|| Value::String(issuer.clone()));
        }

        let mut base = Self::base(context);
        base.ticket = Some(AuthenticationTicket::new(
            Some(principal),
            properties,
            options.authentication.authentication_scheme.clone(),
        ));
        let mut completed = AuthenticationCompletedContext { base };
        debug!(event = %LifecyclePoint::AuthenticationCompleted, "Invoking event");
        options.events.authentication_completed(&mut completed).await?;

        if completed.base.is_skipped() {
            return Ok(None);
        }
        Ok(completed.base.ticket)
    }

    async fn receive_id_token(
        &self,
        context: &Context,
        id_token: String,
        message: &OpenIdConnectMessage,
    ) -> Step<ClaimsPrincipal> {
        let options = context.options();

        let mut received = IdTokenReceivedContext {
            base: Self::base(context),
            id_token,
            protocol_message: message.clone(),
        };
        debug!(event = %LifecyclePoint::IdTokenReceived, "Invoking event");
        options.events.id_token_received(&mut received).await?;
        if let ControlFlow::Break(outcome) = received.base.control_flow() {
            return Ok(ControlFlow::Break(outcome));
        }

        let principal = self
            .protocol
            .validate_id_token(&received.id_token, options)
            .await?;

        let mut validated = IdTokenValidatedContext {
            base: Self::base(context),
            principal,
            protocol_message: received.protocol_message,
        };
        debug!(event = %LifecyclePoint::IdTokenValidated, "Invoking event");
        options.events.id_token_validated(&mut validated).await?;
        if let ControlFlow::Break(outcome) = validated.base.control_flow() {
            return Ok(ControlFlow::Break(outcome));
        }

        Ok(ControlFlow::Continue(validated.principal))
    }

    async fn receive_code(
        &self,
        context: &Context,
        code: String,
        message: &OpenIdConnectMessage,
        principal: Option<ClaimsPrincipal>,
    ) -> Step<TokenResponse> {
        let options = context.options();

        let mut received = AuthorizationCodeReceivedContext {
            base: Self::base(context),
            code,
            protocol_message: message.clone(),
            redirect_uri: context.build_redirect_uri(&options.callback_path),
            principal,
            token_response: None,
        };
        debug!(event = %LifecyclePoint::AuthorizationCodeReceived, "Invoking event");
        options
            .events
            .authorization_code_received(&mut received)
            .await?;
        if let ControlFlow::Break(outcome) = received.base.control_flow() {
            return Ok(ControlFlow::Break(outcome));
        }

        let token_response = if let Some(token_response) = received.token_response.take() {
            debug!("Authorization code redeemed by application callback");
            token_response
        } else {
            self.protocol
                .redeem_code(&received.code, &received.redirect_uri, options)
                .await?
        };

        let mut redeemed = AuthorizationCodeRedeemedContext {
            base: Self::base(context),
            code: received.code,
            token_response,
        };
        debug!(event = %LifecyclePoint::AuthorizationCodeRedeemed, "Invoking event");
        options
            .events
            .authorization_code_redeemed(&mut redeemed)
            .await?;
        if let ControlFlow::Break(outcome) = redeemed.base.control_flow() {
            return Ok(ControlFlow::Break(outcome));
        }

        Ok(ControlFlow::Continue(redeemed.token_response))
    }

    async fn receive_user_information(
        &self,
        context: &Context,
        principal: ClaimsPrincipal,
        token_response: Option<&TokenResponse>,
        message: &OpenIdConnectMessage,
    ) -> Step<ClaimsPrincipal> {
        let options = context.options();

        let Some(access_token) = token_response.and_then(|r| r.access_token.as_deref()) else {
            return Err(Error::Protocol(
                "no access_token available for the userinfo endpoint".to_string(),
            ));
        };

        let user = self.protocol.user_information(access_token, options).await?;

        if let (Some(expected), Some(actual)) =
            (principal.subject(), user.get("sub").and_then(Value::as_str))
        {
            if expected != actual {
                let msg = format!("userinfo subject '{actual}' does not match id_token subject");
                return Err(Error::Authentication(msg));
            }
        }

        let mut received = UserInformationReceivedContext {
            base: Self::base(context),
            user,
            principal,
            protocol_message: message.clone(),
        };
        debug!(event = %LifecyclePoint::UserInformationReceived, "Invoking event");
        options
            .events
            .user_information_received(&mut received)
            .await?;
        if let ControlFlow::Break(outcome) = received.base.control_flow() {
            return Ok(ControlFlow::Break(outcome));
        }

        let mut principal = received.principal;
        if let Value::Object(claims) = received.user {
            for (name, value) in claims {
                principal.claims.entry(name).or_insert(value);
            }
        }

        Ok(ControlFlow::Continue(principal))
    }

    async fn authentication_failed(
        &self,
        context: &Context,
        error: Error,
        message: Option<OpenIdConnectMessage>,
    ) -> Result<Option<AuthenticationTicket>, Error> {
        warn!("OpenID Connect authentication failed: {error}");

        let mut failed = AuthenticationFailedContext {
            base: Self::base(context),
            error: error.clone(),
            protocol_message: message,
        };
        debug!(event = %LifecyclePoint::AuthenticationFailed, "Invoking event");
        context
            .options()
            .events
            .authentication_failed(&mut failed)
            .await?;

        match failed.base.state() {
            EventState::HandledResponse => {
                debug!("Authentication failure handled by application callback");
                Ok(failed.base.ticket)
            }
            EventState::Skipped => {
                debug!("Authentication failure skipped by application callback");
                Ok(None)
            }
            EventState::Continue => Err(error),
        }
    }
}

fn save_tokens(
    properties: &mut AuthenticationProperties,
    token_response: Option<&TokenResponse>,
    message: &OpenIdConnectMessage,
) {
    let id_token = token_response
        .and_then(|response| response.id_token.as_deref())
        .or_else(|| message.id_token());

    let tokens = [
        ("id_token", id_token),
        (
            "access_token",
            token_response.and_then(|response| response.access_token.as_deref()),
        ),
        (
            "refresh_token",
            token_response.and_then(|response| response.refresh_token.as_deref()),
        ),
        (
            "token_type",
            token_response.and_then(|response| response.token_type.as_deref()),
        ),
    ];

    for (name, value) in tokens {
        if let Some(value) = value {
            properties.set_item(format!("{TOKEN_PREFIX}{name}"), value);
        }
    }

    if let Some(expires_utc) = properties.expires_utc {
        properties.set_item(format!("{TOKEN_PREFIX}expires_at"), expires_utc.to_rfc3339());
    }
}

#[async_trait]
impl HandlerBehavior for OpenIdConnectHandler {
    type Options = OpenIdConnectOptions;

    #[instrument(skip_all)]
    async fn handle_authenticate(
        &self,
        context: &Context,
    ) -> Result<Option<AuthenticationTicket>, Error> {
        let mut message = match self
            .protocol
            .read_message(context.request(), context.options())
            .await
        {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!("Request carries no authorization response");
                return Ok(None);
            }
            Err(error) => return self.authentication_failed(context, error, None).await,
        };

        match self.process_message(context, &mut message).await {
            Ok(ticket) => Ok(ticket),
            Err(error) => {
                self.authentication_failed(context, error, Some(message))
                    .await
            }
        }
    }

    async fn handle_unauthorized(
        &self,
        context: &Context,
        properties: &AuthenticationProperties,
    ) -> Result<HandlerResponse, Error> {
        let options = context.options();

        let mut properties = properties.clone();
        if properties.redirect_uri.is_none() {
            properties.redirect_uri = Some(context.current_uri());
        }

        let redirect_uri = context.build_redirect_uri(&options.callback_path);
        let message = self
            .protocol
            .authentication_request(&redirect_uri, &properties, options)
            .await?;

        let mut redirect = RedirectContext {
            base: Self::base(context),
            protocol_message: message,
            properties,
        };
        debug!(event = %LifecyclePoint::RedirectToAuthenticationEndpoint, "Invoking event");
        options
            .events
            .redirect_to_authentication_endpoint(&mut redirect)
            .await?;

        match redirect.base.state() {
            EventState::HandledResponse => Ok(HandlerResponse::Handled),
            EventState::Skipped => Ok(HandlerResponse::Status(StatusCode::UNAUTHORIZED)),
            EventState::Continue => {
                let location = redirect.protocol_message.create_url(context.encoder())?;
                debug!(%location, "Redirecting to the authorization endpoint");
                Ok(HandlerResponse::Redirect { location })
            }
        }
    }

    async fn handle_sign_out(
        &self,
        context: &Context,
        properties: &AuthenticationProperties,
    ) -> Result<HandlerResponse, Error> {
        let options = context.options();

        let mut properties = properties.clone();
        if properties.redirect_uri.is_none() {
            properties
                .redirect_uri
                .clone_from(&options.signed_out_redirect_uri);
        }

        let message = self
            .protocol
            .end_session_request(&properties, options)
            .await?;

        let mut redirect = RedirectContext {
            base: Self::base(context),
            protocol_message: message,
            properties,
        };
        debug!(event = %LifecyclePoint::RedirectToEndSessionEndpoint, "Invoking event");
        options
            .events
            .redirect_to_end_session_endpoint(&mut redirect)
            .await?;

        match redirect.base.state() {
            EventState::HandledResponse | EventState::Skipped => Ok(HandlerResponse::Handled),
            EventState::Continue => {
                let location = redirect.protocol_message.create_url(context.encoder())?;
                debug!(%location, "Redirecting to the end session endpoint");
                Ok(HandlerResponse::Redirect { location })
            }
        }
    }
}
