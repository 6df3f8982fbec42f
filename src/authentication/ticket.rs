use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimsPrincipal {
    pub authentication_type: Option<String>,
    pub claims: HashMap<String, Value>,
}

impl ClaimsPrincipal {
    pub fn new(authentication_type: impl Into<String>) -> Self {
        Self {
            authentication_type: Some(authentication_type.into()),
            claims: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn subject(&self) -> Option<&str> {
        self.claim("sub").and_then(Value::as_str)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication_type.is_some()
    }
}

/// State carried alongside a ticket.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationProperties {
    #[serde(default)]
    pub items: HashMap<String, String>,
    pub redirect_uri: Option<String>,
    pub issued_utc: Option<DateTime<Utc>>,
    pub expires_utc: Option<DateTime<Utc>>,
}

impl AuthenticationProperties {
    pub fn with_redirect_uri(redirect_uri: impl Into<String>) -> Self {
        Self {
            redirect_uri: Some(redirect_uri.into()),
            ..Self::default()
        }
    }

    pub fn item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.items.insert(key.into(), value.into());
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationTicket {
    pub principal: Option<ClaimsPrincipal>,
    pub properties: AuthenticationProperties,
    pub authentication_scheme: Option<String>,
}

impl AuthenticationTicket {
    pub fn new(
        principal: Option<ClaimsPrincipal>,
        properties: AuthenticationProperties,
        authentication_scheme: Option<String>,
    ) -> Self {
        Self {
            principal,
            properties,
            authentication_scheme,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_principal_claims() {
        let principal = ClaimsPrincipal::new("oidc")
            .with_claim("sub", "user-1")
            .with_claim("groups", json!(["admins", "ops"]));

        assert!(principal.is_authenticated());
        assert_eq!(principal.subject(), Some("user-1"));
        assert_eq!(principal.claim("groups"), Some(&json!(["admins", "ops"])));
        assert!(principal.claim("email").is_none());
    }

    #[test]
    fn test_principal_without_type_is_anonymous() {
        let principal = ClaimsPrincipal::default().with_claim("sub", 42);
        assert!(!principal.is_authenticated());
        assert_eq!(principal.subject(), None);
    }

    #[test]
    fn test_properties_items() {
        let mut properties = AuthenticationProperties::with_redirect_uri("/home");
        properties.set_item(".Token.access_token", "abc");

        assert_eq!(properties.redirect_uri.as_deref(), Some("/home"));
        assert_eq!(properties.item(".Token.access_token"), Some("abc"));
        assert_eq!(properties.item("missing"), None);
    }

    #[test]
    fn test_ticket_serialize() {
        let ticket = AuthenticationTicket::new(
            Some(ClaimsPrincipal::new("oidc").with_claim("sub", "user-1")),
            AuthenticationProperties::default(),
            Some("Corporate".to_string()),
        );

        let value = serde_json::to_value(&ticket).unwrap();
        assert_eq!(value["principal"]["claims"]["sub"], "user-1");
        assert_eq!(value["authentication_scheme"], "Corporate");
    }
}
