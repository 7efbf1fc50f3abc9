//! Error types module
//!
//! All failures of the artifact pipeline are unified under `ArtifactError`.
//! Every variant is terminal at the operation boundary: nothing in Artifex
//! retries automatically, so `is_recoverable` only tells the caller whether a
//! user-initiated retry can succeed.

use std::io;

use crate::validation::ValidationError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for failures the user can act on
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// Size/type/count violation detected locally. Never reaches the network.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Unauthenticated: no session token available")]
    Unauthenticated,

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ArtifactError {
    /// Machine-readable error code (e.g., "UNAUTHENTICATED")
    pub fn error_code(&self) -> &'static str {
        match self {
            ArtifactError::Validation(_) => "VALIDATION_ERROR",
            ArtifactError::Unauthenticated => "UNAUTHENTICATED",
            ArtifactError::Api { status, .. } if *status == 404 => "NOT_FOUND",
            ArtifactError::Api { status, .. } if *status == 401 || *status == 403 => {
                "UNAUTHORIZED"
            }
            ArtifactError::Api { .. } => "API_ERROR",
            ArtifactError::Transport(_) => "TRANSPORT_ERROR",
            ArtifactError::InvalidResponse(_) => "INVALID_RESPONSE",
            ArtifactError::Io(_) => "IO_ERROR",
            ArtifactError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Whether re-issuing the same operation by hand can succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ArtifactError::Validation(_)
            | ArtifactError::Unauthenticated
            | ArtifactError::Config(_) => false,
            ArtifactError::Api { status, .. } => *status >= 500 || *status == 429,
            ArtifactError::Transport(_) | ArtifactError::InvalidResponse(_) | ArtifactError::Io(_) => {
                true
            }
        }
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        match self {
            ArtifactError::Validation(_) => LogLevel::Debug,
            ArtifactError::Unauthenticated | ArtifactError::Config(_) => LogLevel::Warn,
            ArtifactError::Api { status, .. } if *status < 500 => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }

    /// User-facing message shown next to the triggering control.
    pub fn client_message(&self) -> String {
        match self {
            ArtifactError::Unauthenticated => "Please log in to upload files".to_string(),
            ArtifactError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArtifactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_is_not_recoverable() {
        let err = ArtifactError::from(ValidationError::TooManyFiles { max: 3 });
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Debug);
        assert_eq!(err.to_string(), "Maximum 3 files allowed");
    }

    #[test]
    fn test_api_error_codes() {
        let not_found = ArtifactError::Api {
            status: 404,
            message: "Artifact not found".to_string(),
        };
        assert_eq!(not_found.error_code(), "NOT_FOUND");
        assert!(!not_found.is_recoverable());
        assert_eq!(not_found.client_message(), "Artifact not found");

        let server = ArtifactError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(server.error_code(), "API_ERROR");
        assert!(server.is_recoverable());
        assert_eq!(server.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_unauthenticated() {
        let err = ArtifactError::Unauthenticated;
        assert_eq!(err.error_code(), "UNAUTHENTICATED");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Please log in to upload files");
    }
}
