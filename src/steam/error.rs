//! Failure taxonomy for store requests.

use thiserror::Error;

/// Maximum number of body characters kept in an [`FetchError::Http`].
const BODY_PREVIEW_CHARS: usize = 200;

/// Errors a single store request can end with.
///
/// None of these abort a run: callers contain them at the page or
/// entry level and decide whether to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("rate limited by the store (HTTP 429)")]
    RateLimited,

    #[error("request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Builds an HTTP error, keeping only a short preview of the body.
    pub fn http(status: u16, body: &str) -> Self {
        let body = if body.chars().count() > BODY_PREVIEW_CHARS {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            format!("{}... (truncated)", preview)
        } else {
            body.to_string()
        };
        FetchError::Http { status, body }
    }

    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::Decode(_))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_truncates_body() {
        let body = "x".repeat(1000);
        let err = FetchError::http(500, &body);
        match &err {
            FetchError::Http { status, body } => {
                assert_eq!(*status, 500);
                assert!(body.ends_with("(truncated)"));
                assert!(body.len() < 300);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_http_error_keeps_short_body() {
        let err = FetchError::http(403, "Access Denied");
        assert_eq!(err, FetchError::Http { status: 403, body: "Access Denied".to_string() });
    }

    #[test]
    fn test_retryable_classification() {
        assert!(FetchError::RateLimited.is_retryable());
        assert!(FetchError::http(502, "").is_retryable());
        assert!(FetchError::Transport("connection reset".to_string()).is_retryable());
        assert!(!FetchError::Decode("expected value".to_string()).is_retryable());
    }

    #[test]
    fn test_from_serde_error() {
        let err: FetchError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
