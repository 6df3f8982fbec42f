use std::fmt;

use hyper::StatusCode;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    Configuration(String),
    Callback(String),
    Protocol(String),
    Authentication(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Configuration(err) => write!(f, "Configuration error: {err}"),
            Error::Callback(err) => write!(f, "Event callback failed: {err}"),
            Error::Protocol(err) => write!(f, "OpenID Connect protocol error: {err}"),
            Error::Authentication(err) => write!(f, "Authentication failed: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Authentication(_) => StatusCode::UNAUTHORIZED,
            Error::Protocol(_) => StatusCode::BAD_REQUEST,
            Error::Configuration(_) | Error::Callback(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::Configuration("client_id is required".to_string());
        assert_eq!(
            format!("{error}"),
            "Configuration error: client_id is required"
        );

        let error = Error::Callback("audit sink unavailable".to_string());
        assert_eq!(
            format!("{error}"),
            "Event callback failed: audit sink unavailable"
        );

        let error = Error::Protocol("access_denied".to_string());
        assert_eq!(
            format!("{error}"),
            "OpenID Connect protocol error: access_denied"
        );

        let error = Error::Authentication("id_token expired".to_string());
        assert_eq!(format!("{error}"), "Authentication failed: id_token expired");
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            Error::Authentication("test".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::Protocol("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Configuration("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::Callback("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
