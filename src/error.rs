//! Error types for the bridge.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BridgeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Upstream error: {message}")]
    Upstream { message: String },

    #[error("Translation error: {message}")]
    Translation { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream {
            message: msg.into(),
        }
    }

    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation {
            message: msg.into(),
        }
    }

    /// Status code reported to the inbound caller.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Translation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Generic message reported to the inbound caller. Details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Translation { .. } => "Invalid request payload",
            Self::Json(_) => "Failed to marshal third-party request",
            _ => "Failed to get response from third-party API",
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_errors_are_bad_requests() {
        let err = BridgeError::translation("messages must not be empty");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Invalid request payload");
    }

    #[test]
    fn test_upstream_errors_are_server_errors() {
        let err = BridgeError::upstream("connection refused");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.public_message(),
            "Failed to get response from third-party API"
        );
    }

    #[test]
    fn test_display_keeps_detail() {
        let err = BridgeError::config("missing cookie");
        assert_eq!(err.to_string(), "Configuration error: missing cookie");
    }
}
