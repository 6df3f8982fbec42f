#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod authentication;
pub mod configuration;
pub mod oidc;
pub mod telemetry;

mod error;
mod request_ext;

pub use error::Error;
