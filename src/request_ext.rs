use hyper::header::{AsHeaderName, HOST};
use hyper::http::request::Parts;

static FORWARDED_PROTO: &str = "x-forwarded-proto";
static DEFAULT_SCHEME: &str = "http";

pub trait HeaderExt {
    fn get_header<K: AsHeaderName>(&self, header: K) -> Option<String>;
    fn request_scheme(&self) -> String;
    fn request_host(&self) -> Option<String>;
}

impl HeaderExt for Parts {
    fn get_header<K>(&self, header: K) -> Option<String>
    where
        K: AsHeaderName,
    {
        self.headers
            .get(header)
            .and_then(|header| header.to_str().ok())
            .map(ToString::to_string)
    }

    fn request_scheme(&self) -> String {
        if let Some(scheme) = self.uri.scheme_str() {
            return scheme.to_string();
        }

        self.get_header(FORWARDED_PROTO)
            .and_then(|proto| proto.split(',').next().map(|p| p.trim().to_lowercase()))
            .filter(|proto| !proto.is_empty())
            .unwrap_or_else(|| DEFAULT_SCHEME.to_string())
    }

    fn request_host(&self) -> Option<String> {
        self.uri
            .authority()
            .map(ToString::to_string)
            .or_else(|| self.get_header(HOST))
    }
}

#[cfg(test)]
mod tests {
    use hyper::Request;

    use super::*;

    fn parts(request: Request<()>) -> Parts {
        let (parts, ()) = request.into_parts();
        parts
    }

    #[test]
    fn test_get_header() {
        let parts = parts(
            Request::builder()
                .header("x-custom", "value")
                .body(())
                .unwrap(),
        );

        assert_eq!(parts.get_header("x-custom"), Some("value".to_string()));
        assert_eq!(parts.get_header("x-missing"), None);
    }

    #[test]
    fn test_request_scheme_from_uri() {
        let parts = parts(
            Request::builder()
                .uri("https://app.example.com/path")
                .header(FORWARDED_PROTO, "http")
                .body(())
                .unwrap(),
        );

        assert_eq!(parts.request_scheme(), "https");
    }

    #[test]
    fn test_request_scheme_from_forwarded_header() {
        let parts = parts(
            Request::builder()
                .uri("/path")
                .header(FORWARDED_PROTO, "HTTPS, http")
                .body(())
                .unwrap(),
        );

        assert_eq!(parts.request_scheme(), "https");
    }

    #[test]
    fn test_request_scheme_default() {
        let parts = parts(Request::builder().uri("/path").body(()).unwrap());
        assert_eq!(parts.request_scheme(), "http");
    }

    #[test]
    fn test_request_host() {
        let parts_with_authority = parts(
            Request::builder()
                .uri("https://app.example.com:8443/path")
                .header(HOST, "ignored.example.com")
                .body(())
                .unwrap(),
        );
        assert_eq!(
            parts_with_authority.request_host(),
            Some("app.example.com:8443".to_string())
        );

        let parts_with_header = parts(
            Request::builder()
                .uri("/path")
                .header(HOST, "app.example.com")
                .body(())
                .unwrap(),
        );
        assert_eq!(
            parts_with_header.request_host(),
            Some("app.example.com".to_string())
        );

        let parts_without_host = parts(Request::builder().uri("/path").body(()).unwrap());
        assert_eq!(parts_without_host.request_host(), None);
    }
}
