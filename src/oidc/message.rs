use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::authentication::UrlEncoder;
use crate::Error;

pub const CODE: &str = "code";
pub const ID_TOKEN: &str = "id_token";
pub const STATE: &str = "state";
pub const ERROR: &str = "error";
pub const ERROR_DESCRIPTION: &str = "error_description";
pub const POST_LOGOUT_REDIRECT_URI: &str = "post_logout_redirect_uri";

/// Parameters of an OpenID Connect request or response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenIdConnectMessage {
    /// Endpoint the message is sent to, when it is a request.
    #[serde(skip)]
    pub issuer_address: Option<String>,
    #[serde(flatten)]
    pub parameters: BTreeMap<String, String>,
}

impl OpenIdConnectMessage {
    pub fn new(issuer_address: impl Into<String>) -> Self {
        Self {
            issuer_address: Some(issuer_address.into()),
            parameters: BTreeMap::new(),
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_parameter(name, value);
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.parameter(CODE)
    }

    pub fn id_token(&self) -> Option<&str> {
        self.parameter(ID_TOKEN)
    }

    pub fn state(&self) -> Option<&str> {
        self.parameter(STATE)
    }

    pub fn error(&self) -> Option<&str> {
        self.parameter(ERROR)
    }

    pub fn error_description(&self) -> Option<&str> {
        self.parameter(ERROR_DESCRIPTION)
    }

    /// Serializes the parameters as the query string of `issuer_address`.
    pub fn create_url(&self, encoder: &dyn UrlEncoder) -> Result<String, Error> {
        let Some(issuer_address) = &self.issuer_address else {
            return Err(Error::Protocol(
                "message has no issuer address to send it to".to_string(),
            ));
        };

        let mut url = issuer_address.clone();
        let mut separator = if issuer_address.contains('?') { '&' } else { '?' };
        for (name, value) in &self.parameters {
            url.push(separator);
            url.push_str(&encoder.encode(name));
            url.push('=');
            url.push_str(&encoder.encode(value));
            separator = '&';
        }

        Ok(url)
    }
}

/// Token endpoint response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
}
