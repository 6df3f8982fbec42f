use std::fmt::Debug;

use url::form_urlencoded;

/// Encodes values placed in URLs built by handlers.
pub trait UrlEncoder: Debug + Send + Sync {
    fn encode(&self, value: &str) -> String;
}

/// `application/x-www-form-urlencoded` encoding.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormUrlEncoder;

impl UrlEncoder for FormUrlEncoder {
    fn encode(&self, value: &str) -> String {
        form_urlencoded::byte_serialize(value.as_bytes()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_encoding() {
        let encoder = FormUrlEncoder;
        assert_eq!(encoder.encode("openid profile"), "openid+profile");
        assert_eq!(
            encoder.encode("https://app.example.com/signin-oidc"),
            "https%3A%2F%2Fapp.example.com%2Fsignin-oidc"
        );
        assert_eq!(encoder.encode("plain"), "plain");
        assert_eq!(encoder.encode(""), "");
    }
}
