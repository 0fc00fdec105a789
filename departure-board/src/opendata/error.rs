//! Transport API error types.

use std::fmt;

/// Maximum number of body characters kept in a parse error.
const BODY_EXCERPT_CHARS: usize = 500;

/// Errors from a single fetch against the transport API.
///
/// Every variant is recoverable by trying again later.
#[derive(Debug)]
pub enum FetchError {
    /// API answered with a non-2xx status; the body is not inspected
    Remote { status: u16 },

    /// Request never completed (connection failure, timeout, etc.)
    Transport(reqwest::Error),

    /// Body was not the JSON structure we expect
    Parse {
        message: String,
        body: Option<String>,
    },
}

/// Payload-free discriminant of [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Remote,
    Transport,
    Parse,
}

impl FetchError {
    /// Build a parse error from a serde failure, keeping an excerpt of the body.
    pub fn parse(err: serde_json::Error, body: &str) -> Self {
        FetchError::Parse {
            message: err.to_string(),
            body: Some(body.chars().take(BODY_EXCERPT_CHARS).collect()),
        }
    }

    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Remote { .. } => FetchErrorKind::Remote,
            FetchError::Transport(_) => FetchErrorKind::Transport,
            FetchError::Parse { .. } => FetchErrorKind::Parse,
        }
    }

    /// HTTP status for remote errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Remote { status } => Some(*status),
            _ => None,
        }
    }

    /// Whether a transport failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Transport(e) if e.is_timeout())
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Remote { status } => write!(f, "API error: HTTP {status}"),
            FetchError::Transport(e) => write!(f, "HTTP error: {e}"),
            FetchError::Parse { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err)
    }
}

/// Errors that can occur when building a [`TransportClient`](super::TransportClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Base URL cannot be turned into endpoint URLs
    #[error("invalid base URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Remote { status: 503 };
        assert_eq!(err.to_string(), "API error: HTTP 503");

        let err = FetchError::Parse {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("<html>"));
    }

    #[test]
    fn kind_and_status() {
        let err = FetchError::Remote { status: 503 };
        assert_eq!(err.kind(), FetchErrorKind::Remote);
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_timeout());

        let err = FetchError::Parse {
            message: "eof".into(),
            body: None,
        };
        assert_eq!(err.kind(), FetchErrorKind::Parse);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn parse_error_truncates_body() {
        let body = "x".repeat(2_000);
        let serde_err = serde_json::from_str::<serde_json::Value>(&body).unwrap_err();
        let err = FetchError::parse(serde_err, &body);

        match err {
            FetchError::Parse { body: Some(excerpt), .. } => {
                assert_eq!(excerpt.len(), BODY_EXCERPT_CHARS);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
