use std::sync::Arc;

use serde::Deserialize;

use super::events::{OidcEvents, OpenIdConnectEvents};
use crate::authentication::{AuthenticationOptions, HandlerOptions};
use crate::Error;

pub const DEFAULT_SCHEME: &str = "OpenIdConnect";

#[derive(Clone, Debug, Deserialize)]
pub struct OpenIdConnectOptions {
    #[serde(flatten)]
    pub authentication: AuthenticationOptions,
    #[serde(default)]
    pub authority: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "OpenIdConnectOptions::default_callback_path")]
    pub callback_path: String,
    #[serde(default)]
    pub signed_out_redirect_uri: Option<String>,
    #[serde(default = "OpenIdConnectOptions::default_response_type")]
    pub response_type: String,
    #[serde(default = "OpenIdConnectOptions::default_scope")]
    pub scope: Vec<String>,
    #[serde(default)]
    pub get_claims_from_user_info_endpoint: bool,
    #[serde(default)]
    pub save_tokens: bool,
    #[serde(skip, default = "OpenIdConnectOptions::default_events")]
    pub events: Arc<dyn OidcEvents>,
}

impl Default for OpenIdConnectOptions {
    fn default() -> Self {
        OpenIdConnectOptions {
            authentication: AuthenticationOptions::new(DEFAULT_SCHEME),
            authority: None,
            client_id: None,
            client_secret: None,
            callback_path: OpenIdConnectOptions::default_callback_path(),
            signed_out_redirect_uri: None,
            response_type: OpenIdConnectOptions::default_response_type(),
            scope: OpenIdConnectOptions::default_scope(),
            get_claims_from_user_info_endpoint: false,
            save_tokens: false,
            events: OpenIdConnectOptions::default_events(),
        }
    }
}

impl OpenIdConnectOptions {
    fn default_callback_path() -> String {
        "/signin-oidc".to_string()
    }

    fn default_response_type() -> String {
        "code id_token".to_string()
    }

    fn default_scope() -> Vec<String> {
        vec!["openid".to_string(), "profile".to_string()]
    }

    fn default_events() -> Arc<dyn OidcEvents> {
        Arc::new(OpenIdConnectEvents::default())
    }

    #[must_use]
    pub fn with_events(mut self, events: impl OidcEvents + 'static) -> Self {
        self.events = Arc::new(events);
        self
    }
}

fn require(value: Option<&str>, name: &str) -> Result<(), Error> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(()),
        _ => Err(Error::Configuration(format!("{name} is required"))),
    }
}

impl HandlerOptions for OpenIdConnectOptions {
    fn authentication(&self) -> &AuthenticationOptions {
        &self.authentication
    }

    fn validate(&self) -> Result<(), Error> {
        require(self.authority.as_deref(), "authority")?;
        require(self.client_id.as_deref(), "client_id")?;

        if !self.callback_path.starts_with('/') {
            let msg = format!(
                "callback_path must start with '/': '{}'",
                self.callback_path
            );
            return Err(Error::Configuration(msg));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> OpenIdConnectOptions {
        OpenIdConnectOptions {
            authority: Some("https://login.example.com".to_string()),
            client_id: Some("relying-party".to_string()),
            ..OpenIdConnectOptions::default()
        }
    }

    #[test]
    fn test_defaults() {
        let options = OpenIdConnectOptions::default();
        assert_eq!(
            options.authentication.authentication_scheme.as_deref(),
            Some(DEFAULT_SCHEME)
        );
        assert!(!options.authentication.automatic_authentication);
        assert_eq!(options.callback_path, "/signin-oidc");
        assert_eq!(options.response_type, "code id_token");
        assert_eq!(options.scope, vec!["openid", "profile"]);
        assert!(!options.save_tokens);
        assert!(!options.get_claims_from_user_info_endpoint);
    }

    #[test]
    fn test_deserialize() {
        let toml = r#"
            authentication_scheme = "Corporate"
            automatic_authentication = true
            authority = "https://login.example.com"
            client_id = "relying-party"
            client_secret = "secret"
            scope = ["openid", "email"]
            save_tokens = true
        "#;

        let options: OpenIdConnectOptions = toml::from_str(toml).unwrap();
        assert_eq!(
            options.authentication.authentication_scheme.as_deref(),
            Some("Corporate")
        );
        assert!(options.authentication.automatic_authentication);
        assert_eq!(options.authority.as_deref(), Some("https://login.example.com"));
        assert_eq!(options.client_secret.as_deref(), Some("secret"));
        assert_eq!(options.scope, vec!["openid", "email"]);
        assert_eq!(options.callback_path, "/signin-oidc");
        assert!(options.save_tokens);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_deserialize_without_scheme() {
        let toml = r#"
            authority = "https://login.example.com"
            client_id = "relying-party"
        "#;

        let options: OpenIdConnectOptions = toml::from_str(toml).unwrap();
        assert!(options.authentication.authentication_scheme.is_none());
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());

        let missing_authority = OpenIdConnectOptions {
            authority: None,
            ..valid()
        };
        assert_eq!(
            missing_authority.validate(),
            Err(Error::Configuration("authority is required".to_string()))
        );

        let blank_client = OpenIdConnectOptions {
            client_id: Some("  ".to_string()),
            ..valid()
        };
        assert_eq!(
            blank_client.validate(),
            Err(Error::Configuration("client_id is required".to_string()))
        );

        let relative_callback = OpenIdConnectOptions {
            callback_path: "signin-oidc".to_string(),
            ..valid()
        };
        assert!(matches!(
            relative_callback.validate(),
            Err(Error::Configuration(_))
        ));
    }
}
