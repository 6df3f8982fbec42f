//! Scheme-aware authentication handler base.
//!
//! A host pipeline builds an [`AuthenticationHandler`] for every request. The
//! handler answers whether it owns a requested scheme and runs the underlying
//! authentication check of its [`HandlerBehavior`] at most once for that request.


pub mod encoder;
pub mod handler;
pub mod options;
pub mod ticket;

pub use encoder::{FormUrlEncoder, UrlEncoder};
pub use handler::{
    AuthenticateResult, AuthenticationHandler, ChallengeBehavior, HandlerBehavior,
    HandlerContext, HandlerResponse,
};
pub use options::{AuthenticationOptions, HandlerOptions};
pub use ticket::{AuthenticationProperties, AuthenticationTicket, ClaimsPrincipal};
