//! Error types for artifact description.

use std::time::Duration;

/// Errors that can occur while describing an artifact or listing models.
#[derive(Debug, thiserror::Error)]
pub enum CuratorError {
    /// `GEMINI_API_KEY` is not configured.
    #[error("GEMINI_API_KEY is not set; add it to the environment or a .env file")]
    MissingApiKey,

    /// API key rejected by the service.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Quota or rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Prompt or response blocked by the service's safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The response could not be interpreted.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Upload is not a JPEG or PNG file.
    #[error("unsupported image type: {0}")]
    UnsupportedImage(String),

    /// Upload exceeds the size ceiling.
    #[error("image is {size} bytes, the limit is {limit} bytes")]
    ImageTooLarge { size: usize, limit: usize },

    /// Upload claims to be an image but cannot be decoded.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The submitted form exceeds the request body limit.
    #[error("upload is larger than the 200MB limit")]
    FormTooLarge,

    /// The submitted form could not be read.
    #[error("invalid form: {0}")]
    InvalidForm(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for curator operations.
pub type Result<T> = std::result::Result<T, CuratorError>;

/// Parses a `Retry-After` header given in whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Extracts `error.message` from a Google API error body, falling back to the
/// raw (truncated) body.
pub(crate) fn api_error_message(body: &str) -> String {
    const MAX_LEN: usize = 500;

    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    if message.chars().count() > MAX_LEN {
        let truncated: String = message.chars().take(MAX_LEN).collect();
        format!("{truncated}...")
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn test_error_display() {
        let err = CuratorError::Api {
            status: 500,
            message: "Internal".into(),
        };
        assert_eq!(err.to_string(), "API error: 500 - Internal");

        let err = CuratorError::ContentBlocked("SAFETY".into());
        assert_eq!(err.to_string(), "content blocked: SAFETY");

        assert_eq!(
            CuratorError::FormTooLarge.to_string(),
            "upload is larger than the 200MB limit"
        );
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(30)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_api_error_message_from_google_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "API key not valid.");
    }

    #[test]
    fn test_api_error_message_plain_body() {
        assert_eq!(api_error_message("  bad gateway \n"), "bad gateway");

        let long = "x".repeat(600);
        let msg = api_error_message(&long);
        assert!(msg.ends_with("..."));
        assert_eq!(msg.len(), 503);
    }
}
