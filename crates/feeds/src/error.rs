//! Error types for feed operations.

use thiserror::Error;

/// Errors that can occur while talking to a remote data service.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout(err.to_string())
        } else if err.is_decode() {
            FeedError::Parse(err.to_string())
        } else {
            FeedError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for FeedError {
    fn from(err: url::ParseError) -> Self {
        FeedError::InvalidUrl(err.to_string())
    }
}

impl FeedError {
    /// Returns true if the remote service asked us to slow down.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FeedError::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rate_limit_is_rate_limited() {
        assert!(FeedError::RateLimited.is_rate_limited());
        assert!(!FeedError::Timeout("X".to_string()).is_rate_limited());
    }

    #[test]
    fn test_status_message() {
        let client = FeedError::Status {
            service: "X",
            status: 400,
            body: "bad query".to_string(),
        };
        assert!(!client.is_rate_limited());
        assert_eq!(client.to_string(), "X returned HTTP 400: bad query");
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let err: FeedError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, FeedError::Parse(_)));
    }
}
