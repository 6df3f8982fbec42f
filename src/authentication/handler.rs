use std::sync::Arc;

use async_trait::async_trait;
use hyper::http::request::Parts;
use hyper::StatusCode;
use tokio::sync::OnceCell;
use tracing::{debug, info_span, warn, Instrument, Span};

use super::encoder::{FormUrlEncoder, UrlEncoder};
use super::options::HandlerOptions;
use super::ticket::{AuthenticationProperties, AuthenticationTicket};
use crate::request_ext::HeaderExt;
use crate::Error;

/// Outcome of [`AuthenticationHandler::authenticate`]: a ticket, or no result.
pub type AuthenticateResult = Option<Arc<AuthenticationTicket>>;

#[derive(Clone, Debug, PartialEq)]
pub enum HandlerResponse {
    Status(StatusCode),
    Redirect { location: String },
    /// The response was produced by application code.
    Handled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChallengeBehavior {
    /// Forbidden when the request is already authenticated, unauthorized otherwise.
    #[default]
    Automatic,
    Unauthorized,
    Forbidden,
}

/// Scheme specific part of an authentication handler.
#[async_trait]
pub trait HandlerBehavior: Send + Sync {
    type Options: HandlerOptions;

    /// Runs the underlying authentication check.
    ///
    /// Called at most once per handler; see [`AuthenticationHandler::authenticate`].
    async fn handle_authenticate(
        &self,
        context: &HandlerContext<Self::Options>,
    ) -> Result<Option<AuthenticationTicket>, Error>;

    async fn handle_unauthorized(
        &self,
        _context: &HandlerContext<Self::Options>,
        _properties: &AuthenticationProperties,
    ) -> Result<HandlerResponse, Error> {
        Ok(HandlerResponse::Status(StatusCode::UNAUTHORIZED))
    }

    async fn handle_forbidden(
        &self,
        _context: &HandlerContext<Self::Options>,
        _properties: &AuthenticationProperties,
    ) -> Result<HandlerResponse, Error> {
        Ok(HandlerResponse::Status(StatusCode::FORBIDDEN))
    }

    async fn handle_sign_out(
        &self,
        _context: &HandlerContext<Self::Options>,
        _properties: &AuthenticationProperties,
    ) -> Result<HandlerResponse, Error> {
        Ok(HandlerResponse::Handled)
    }
}

/// Request scoped collaborators handed to a handler at construction.
#[derive(Debug)]
pub struct HandlerContext<O> {
    options: Arc<O>,
    request: Arc<Parts>,
    span: Span,
    encoder: Arc<dyn UrlEncoder>,
}

impl<O: HandlerOptions> HandlerContext<O> {
    pub fn new(options: Arc<O>, request: Arc<Parts>) -> Self {
        let span = info_span!(
            "authentication",
            scheme = options
                .authentication()
                .authentication_scheme
                .as_deref()
                .unwrap_or_default()
        );

        Self {
            options,
            request,
            span,
            encoder: Arc::new(FormUrlEncoder),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    #[must_use]
    pub fn with_encoder(mut self, encoder: Arc<dyn UrlEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn options(&self) -> &Arc<O> {
        &self.options
    }

    pub fn request(&self) -> &Arc<Parts> {
        &self.request
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn encoder(&self) -> &dyn UrlEncoder {
        self.encoder.as_ref()
    }

    fn origin(&self) -> String {
        let scheme = self.request.request_scheme();
        let host = self
            .request
            .request_host()
            .unwrap_or_else(|| "localhost".to_string());

        format!("{scheme}://{host}")
    }

    pub fn current_uri(&self) -> String {
        let path_and_query = self
            .request
            .uri
            .path_and_query()
            .map_or("/", |path_and_query| path_and_query.as_str());

        format!("{}{path_and_query}", self.origin())
    }

    pub fn build_redirect_uri(&self, target_path: &str) -> String {
        format!("{}{target_path}", self.origin())
    }
}

/// Per-request authentication handler.
///
/// The host builds one handler per request. The outcome of the first
/// [`authenticate`](Self::authenticate) call, failure included, is returned by every
/// later call on the same handler, so the handler must never be reused across requests.
pub struct AuthenticationHandler<B: HandlerBehavior> {
    behavior: B,
    context: HandlerContext<B::Options>,
    outcome: OnceCell<Result<AuthenticateResult, Error>>,
}

impl<B: HandlerBehavior> AuthenticationHandler<B> {
    pub fn new(behavior: B, context: HandlerContext<B::Options>) -> Result<Self, Error> {
        context.options.validate()?;

        Ok(Self {
            behavior,
            context,
            outcome: OnceCell::new(),
        })
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn context(&self) -> &HandlerContext<B::Options> {
        &self.context
    }

    pub fn options(&self) -> &B::Options {
        &self.context.options
    }

    pub fn should_handle_scheme(&self, requested: Option<&str>) -> bool {
        self.options()
            .authentication()
            .should_handle_scheme(requested)
    }

    /// Returns the memoized authentication outcome for this request.
    ///
    /// Concurrent callers wait for the single in-flight check.
    pub async fn authenticate(&self) -> Result<AuthenticateResult, Error> {
        self.outcome
            .get_or_init(|| self.authenticate_once())
            .await
            .clone()
    }

    async fn authenticate_once(&self) -> Result<AuthenticateResult, Error> {
        let span = self.context.span.clone();

        async {
            let outcome = self.behavior.handle_authenticate(&self.context).await;
            match &outcome {
                Ok(Some(_)) => debug!("Authentication produced a ticket"),
                Ok(None) => debug!("Authentication produced no result"),
                Err(error) => warn!("Authentication failed: {error}"),
            }

            outcome.map(|ticket| ticket.map(Arc::new))
        }
        .instrument(span)
        .await
    }

    /// Returns `Ok(None)` when `scheme` is not handled by this handler.
    pub async fn challenge(
        &self,
        scheme: Option<&str>,
        behavior: ChallengeBehavior,
        properties: &AuthenticationProperties,
    ) -> Result<Option<HandlerResponse>, Error> {
        if !self.should_handle_scheme(scheme) {
            debug!(?scheme, "Challenge is not for this handler");
            return Ok(None);
        }

        let behavior = match behavior {
            ChallengeBehavior::Automatic => {
                if self.authenticate().await?.is_some() {
                    ChallengeBehavior::Forbidden
                } else {
                    ChallengeBehavior::Unauthorized
                }
            }
            explicit => explicit,
        };

        let response = match behavior {
            ChallengeBehavior::Forbidden => {
                self.behavior
                    .handle_forbidden(&self.context, properties)
                    .await?
            }
            ChallengeBehavior::Unauthorized | ChallengeBehavior::Automatic => {
                self.behavior
                    .handle_unauthorized(&self.context, properties)
                    .await?
            }
        };

        Ok(Some(response))
    }

    /// Returns `Ok(None)` when `scheme` is not handled by this handler.
    pub async fn sign_out(
        &self,
        scheme: Option<&str>,
        properties: &AuthenticationProperties,
    ) -> Result<Option<HandlerResponse>, Error> {
        if !self.should_handle_scheme(scheme) {
            debug!(?scheme, "Sign-out is not for this handler");
            return Ok(None);
        }

        self.behavior
            .handle_sign_out(&self.context, properties)
            .await
            .map(Some)
    }
}
