//! Error types for the import backend
//!
//! HTTP failures are classified by status the way the backend reports them:
//! - 400: the file or payload was rejected
//! - 401/403: authentication or access failure
//! - 404: incident not found
//! - 5xx: backend failure

/// Import backend error
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Upload attempted without a file name
    #[error("no file selected")]
    NoFileSelected,

    /// Request rejected as malformed (400)
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// Authentication or authorization failure (401/403)
    #[error("authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    /// Resource not found (404)
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Backend failure (5xx)
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other error status
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport failure or undecodable response
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Reading the upload from disk failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Unusable client configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Classify an error response
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => Self::BadRequest { message },
            401 | 403 => Self::Authentication { status, message },
            404 => Self::NotFound { message },
            500..=599 => Self::Server { status, message },
            _ => Self::Api { status, message },
        }
    }

    /// HTTP status, if the backend answered
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::NotFound { .. } => Some(404),
            Self::Authentication { status, .. }
            | Self::Server { status, .. }
            | Self::Api { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether a manual retry of the same request may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Network(_))
    }
}

/// Message carried by an error body
///
/// Looks at `message`, then `error`, then `msg`; falls back to the raw text.
#[must_use]
pub fn error_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "msg"] {
            if let Some(serde_json::Value::String(s)) = map.get(key) {
                return s.clone();
            }
        }
    }

    if body.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_statuses() {
        assert!(matches!(ClientError::from_status(400, "x"), ClientError::BadRequest { .. }));
        assert!(matches!(
            ClientError::from_status(403, "x"),
            ClientError::Authentication { status: 403, .. }
        ));
        assert!(matches!(ClientError::from_status(404, "x"), ClientError::NotFound { .. }));
        assert!(matches!(
            ClientError::from_status(502, "x"),
            ClientError::Server { status: 502, .. }
        ));
        assert!(matches!(
            ClientError::from_status(409, "x"),
            ClientError::Api { status: 409, .. }
        ));
    }

    #[test]
    fn retryable_only_for_transient_failures() {
        assert!(ClientError::from_status(500, "boom").is_retryable());
        assert!(!ClientError::from_status(400, "bad").is_retryable());
        assert!(!ClientError::NoFileSelected.is_retryable());
    }

    #[test]
    fn extracts_message_from_body() {
        assert_eq!(
            error_message(r#"{"error": "bad_request", "message": "No file provided"}"#),
            "No file provided"
        );
        assert_eq!(error_message(r#"{"error": "server_error"}"#), "server_error");
        assert_eq!(error_message(r#"{"msg": "Token has expired"}"#), "Token has expired");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(""), "Unknown error");
    }

    #[test]
    fn status_accessor() {
        assert_eq!(ClientError::from_status(401, "x").status(), Some(401));
        assert_eq!(ClientError::NoFileSelected.status(), None);
    }
}
