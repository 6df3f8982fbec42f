use serde::Deserialize;

use crate::Error;

/// Settings shared by every authentication handler.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct AuthenticationOptions {
    #[serde(default)]
    pub authentication_scheme: Option<String>,
    /// Handle requests that do not name a scheme.
    #[serde(default)]
    pub automatic_authentication: bool,
    #[serde(default)]
    pub claims_issuer: Option<String>,
}

impl AuthenticationOptions {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            authentication_scheme: Some(scheme.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn automatic(mut self, automatic_authentication: bool) -> Self {
        self.automatic_authentication = automatic_authentication;
        self
    }

    /// An exact (ordinal) match always wins. Otherwise an automatic handler
    /// accepts a missing or empty scheme; whitespace is not empty.
    pub fn should_handle_scheme(&self, requested: Option<&str>) -> bool {
        if self.authentication_scheme.as_deref() == requested {
            return true;
        }

        self.automatic_authentication && requested.is_none_or(str::is_empty)
    }
}

/// Options consumed by [`AuthenticationHandler`](super::AuthenticationHandler).
pub trait HandlerOptions: Send + Sync + 'static {
    fn authentication(&self) -> &AuthenticationOptions;

    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl HandlerOptions for AuthenticationOptions {
    fn authentication(&self) -> &AuthenticationOptions {
        self
    }
}
