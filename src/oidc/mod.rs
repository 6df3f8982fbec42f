//! OpenID Connect relying party: lifecycle callbacks and the flow handler
//! built on the [`authentication`](crate::authentication) base.

pub mod events;
pub mod handler;
pub mod message;
pub mod options;
pub mod protocol;

pub use events::{LifecyclePoint, OidcEvents, OpenIdConnectEvents};
pub use handler::OpenIdConnectHandler;
pub use message::{OpenIdConnectMessage, TokenResponse};
pub use options::{OpenIdConnectOptions, DEFAULT_SCHEME};
pub use protocol::OidcProtocol;
