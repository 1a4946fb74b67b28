//! Credential header parsing.

use axum::http::{HeaderMap, header};

/// Header carrying the caller's refresh token.
pub const REFRESH_TOKEN_HEADER: &str = "refresh-token";

const BEARER_PREFIX: &str = "Bearer ";

/// Read a header as text. A present but non-ASCII header reads as an empty
/// string so it fails verification instead of counting as absent.
fn header_text<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> Option<&'a str> {
    headers.get(name).map(|value| value.to_str().unwrap_or(""))
}

/// Extract the access token from `Authorization`, stripping a `Bearer ` prefix if present.
pub fn access_token(headers: &HeaderMap) -> Option<&str> {
    let value = header_text(headers, header::AUTHORIZATION)?.trim();
    // Case-sensitive: `bearer <token>` is left as-is and fails to decode.
    Some(value.strip_prefix(BEARER_PREFIX).unwrap_or(value))
}

/// Extract the refresh token from the `Refresh-Token` header.
pub fn refresh_token(headers: &HeaderMap) -> Option<&str> {
    header_text(headers, REFRESH_TOKEN_HEADER).map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_prefix_stripped() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );

        assert_eq!(access_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_raw_token_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("abc.def.ghi"));

        assert_eq!(access_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_lowercase_bearer_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc"));

        assert_eq!(access_token(&headers), Some("bearer abc"));
    }

    #[test]
    fn test_no_header() {
        let headers = HeaderMap::new();
        assert_eq!(access_token(&headers), None);
        assert_eq!(refresh_token(&headers), None);
    }

    #[test]
    fn test_refresh_header_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::HeaderName::from_bytes(b"Refresh-Token").unwrap(),
            HeaderValue::from_static("  xyz  "),
        );

        assert_eq!(refresh_token(&headers), Some("xyz"));
    }

    #[test]
    fn test_non_ascii_header_reads_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff").unwrap(),
        );

        assert_eq!(access_token(&headers), Some(""));
    }
}
