//! Request and response logging with header redaction.
//!
//! Credentials passed with `--header` (or stored on an alias) never reach
//! the log output: values of well-known secret headers are replaced by
//! [`constants::REDACTED`].

use crate::constants;
use reqwest::header::HeaderMap;
use tracing::{debug, trace};

/// Default truncation length for logged response bodies
const DEFAULT_MAX_BODY_LEN: usize = 1000;

/// Checks if a header name should be redacted
#[must_use]
pub fn should_redact_header(header_name: &str) -> bool {
    let lower = header_name.to_lowercase();
    matches!(
        lower.as_str(),
        "authorization"
            | "proxy-authorization"
            | "cookie"
            | "x-api-key"
            | "x-access-token"
            | "x-auth-token"
            | "api-key"
            | "api_key"
            | "token"
            | "secret"
            | "password"
    )
}

/// Header value as it may appear in logs
#[must_use]
pub fn display_header_value(name: &str, value: &[u8]) -> String {
    if should_redact_header(name) {
        constants::REDACTED.to_string()
    } else {
        String::from_utf8_lossy(value).to_string()
    }
}

/// The text printed by `--log-http`: request line followed by the body
#[must_use]
pub fn format_request(method: &str, url: &str, body: Option<&str>) -> String {
    format!("Request: {method} {url}\n{}", body.unwrap_or_default())
}

/// Logs an outgoing request; headers and body at trace level
pub fn log_request(method: &str, url: &str, headers: &HeaderMap, body: Option<&str>) {
    debug!(target: "aepcli::executor", "→ {} {}", method, url);
    for (name, value) in headers {
        trace!(
            target: "aepcli::executor",
            "  {}: {}",
            name.as_str(),
            display_header_value(name.as_str(), value.as_bytes())
        );
    }
    if let Some(body) = body {
        trace!(target: "aepcli::executor", "Request body: {}", body);
    }
}

/// Logs a received response, truncating long bodies
pub fn log_response(status: u16, duration_ms: u128, body: &str) {
    debug!(target: "aepcli::executor", "← {} ({}ms)", status, duration_ms);
    if body.len() > DEFAULT_MAX_BODY_LEN {
        let cut = (0..=DEFAULT_MAX_BODY_LEN)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        trace!(
            target: "aepcli::executor",
            "Response body: {} (truncated at {} bytes)",
            &body[..cut],
            DEFAULT_MAX_BODY_LEN
        );
    } else {
        trace!(target: "aepcli::executor", "Response body: {}", body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_redact_header() {
        assert!(should_redact_header("Authorization"));
        assert!(should_redact_header("X-API-Key"));
        assert!(should_redact_header("api_key"));
        assert!(!should_redact_header("Content-Type"));
        assert!(!should_redact_header("X-Request-Id"));
    }

    #[test]
    fn test_display_header_value() {
        assert_eq!(
            display_header_value("authorization", b"Bearer abc"),
            "[REDACTED]"
        );
        assert_eq!(display_header_value("accept", b"text/plain"), "text/plain");
    }

    #[test]
    fn test_format_request() {
        assert_eq!(
            format_request("POST", "http://localhost/books", Some(r#"{"a":1}"#)),
            "Request: POST http://localhost/books\n{\"a\":1}"
        );
        assert_eq!(
            format_request("GET", "http://localhost/books/1", None),
            "Request: GET http://localhost/books/1\n"
        );
    }
}
