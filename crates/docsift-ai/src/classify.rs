//! Mapping of remote failures onto [`AiError`].
//!
//! Checks run in a fixed order: quota, size, a 401 status, a 5xx status,
//! then credential and availability signals. A 400 that carries a size
//! signal is therefore never reported as an invalid request, and a 5xx is
//! always reported as unavailable.

use docsift_core::{AiError, RemoteError};

const QUOTA_SIGNALS: &[&str] = &[
    "quota",
    "rate_limit",
    "rate-limit",
    "ratelimit",
    "resource_exhausted",
];

const SIZE_SIGNALS: &[&str] = &[
    "context_length",
    "context length",
    "maximum context",
    "too_large",
    "too large",
    "too_long",
    "too long",
    "too many tokens",
    "max_tokens",
    "oversized",
];

const AUTH_SIGNALS: &[&str] = &[
    "invalid_api_key",
    "invalid api key",
    "incorrect api key",
    "authentication",
    "unauthorized",
    "invalid_request",
];

const UNAVAILABLE_SIGNALS: &[&str] = &[
    "timeout",
    "timed_out",
    "connection",
    "server_error",
    "overloaded",
    "unavailable",
];

/// Classify a remote failure.
#[must_use]
pub fn classify(error: &RemoteError) -> AiError {
    let message = error.message.clone();
    let status = error.status_code;

    if status == Some(429) || has_signal(error, QUOTA_SIGNALS) {
        return AiError::QuotaExceeded { message };
    }

    if status == Some(413)
        || (status == Some(400)
            && (has_signal(error, SIZE_SIGNALS) || mentions(&error.message, SIZE_SIGNALS)))
    {
        return AiError::ContentTooLarge { message };
    }

    if status == Some(401) {
        return AiError::AuthFailure { message };
    }

    if status.is_some_and(|s| s >= 500) {
        return AiError::ServiceUnavailable { message };
    }

    if has_signal(error, AUTH_SIGNALS) {
        return AiError::AuthFailure { message };
    }

    if has_signal(error, UNAVAILABLE_SIGNALS) {
        return AiError::ServiceUnavailable { message };
    }

    AiError::GenericFailure { message }
}

/// Whether the error type or code contains any of `signals`.
fn has_signal(error: &RemoteError, signals: &[&str]) -> bool {
    [&error.error_type, &error.error_code]
        .into_iter()
        .flatten()
        .any(|value| mentions(value, signals))
}

fn mentions(value: &str, signals: &[&str]) -> bool {
    let value = value.to_ascii_lowercase();
    signals.iter().any(|signal| value.contains(signal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_core::ErrorKind;
    use std::time::Duration;

    fn kind(error: RemoteError) -> ErrorKind {
        classify(&error).kind()
    }

    #[test]
    fn test_status_429_is_quota() {
        assert_eq!(
            kind(RemoteError::new("Too Many Requests").with_status(429)),
            ErrorKind::QuotaExceeded
        );
    }

    #[test]
    fn test_quota_type_without_status() {
        assert_eq!(
            kind(RemoteError::new("You exceeded your current quota").with_type("insufficient_quota")),
            ErrorKind::QuotaExceeded
        );
        assert_eq!(
            kind(RemoteError::new("slow down").with_code("rate_limit_exceeded")),
            ErrorKind::QuotaExceeded
        );
    }

    #[test]
    fn test_status_401_is_auth() {
        assert_eq!(
            kind(RemoteError::new("Unauthorized").with_status(401)),
            ErrorKind::AuthFailure
        );
    }

    #[test]
    fn test_invalid_key_code_is_auth() {
        assert_eq!(
            kind(RemoteError::new("Incorrect API key provided").with_code("invalid_api_key")),
            ErrorKind::AuthFailure
        );
    }

    #[test]
    fn test_server_error_with_invalid_request_type_is_unavailable() {
        let error = RemoteError::new("upstream rejected the request")
            .with_status(503)
            .with_type("invalid_request_error");
        assert_eq!(kind(error), ErrorKind::ServiceUnavailable);
    }

    #[test]
    fn test_invalid_request_without_size_signal_is_auth() {
        let error = RemoteError::new("bad request")
            .with_status(400)
            .with_type("invalid_request_error");
        assert_eq!(kind(error), ErrorKind::AuthFailure);
    }

    #[test]
    fn test_context_length_is_too_large() {
        let error = RemoteError::new("This model's maximum context length is 128000 tokens")
            .with_status(400)
            .with_type("invalid_request_error")
            .with_code("context_length_exceeded");
        assert_eq!(kind(error), ErrorKind::ContentTooLarge);
    }

    #[test]
    fn test_size_signal_in_message_only() {
        let error = RemoteError::new("Request payload is too large").with_status(400);
        assert_eq!(kind(error), ErrorKind::ContentTooLarge);
    }

    #[test]
    fn test_status_413_is_too_large() {
        assert_eq!(
            kind(RemoteError::new("Payload Too Large").with_status(413)),
            ErrorKind::ContentTooLarge
        );
    }

    #[test]
    fn test_server_errors_are_unavailable() {
        for status in [500, 502, 503, 504] {
            assert_eq!(
                kind(RemoteError::new("upstream").with_status(status)),
                ErrorKind::ServiceUnavailable
            );
        }
    }

    #[test]
    fn test_timeout_is_unavailable() {
        assert_eq!(
            kind(RemoteError::timeout(Duration::from_secs(60))),
            ErrorKind::ServiceUnavailable
        );
    }

    #[test]
    fn test_connection_failure_is_unavailable() {
        assert_eq!(
            kind(RemoteError::new("connection refused").with_type("connection")),
            ErrorKind::ServiceUnavailable
        );
    }

    #[test]
    fn test_everything_else_is_generic() {
        let error = RemoteError::new("model returned malformed response").with_status(404);
        let classified = classify(&error);
        assert_eq!(classified.kind(), ErrorKind::GenericFailure);
        assert_eq!(classified.to_string(), "model returned malformed response");

        assert_eq!(kind(RemoteError::new("???")), ErrorKind::GenericFailure);
    }

    #[test]
    fn test_message_is_preserved() {
        let classified = classify(&RemoteError::new("quota gone").with_status(429));
        assert_eq!(classified.message(), "quota gone");
    }
}
