//! Core error types and utilities

use thiserror::Error;

/// Errors produced by the detachment subsystem
#[derive(Error, Debug)]
pub enum DetachError {
    #[error("Spawn error: {0}")]
    Spawn(String),

    #[error("Signal error: {0}")]
    Signal(String),

    #[error("Invalid detach action: {0}")]
    InvalidAction(String),

    #[error("Missing command: {0}")]
    MissingCommand(String),

    #[error("Stop failed: {0}")]
    StopFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, DetachError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DetachError::InvalidAction("reload".to_string());
        assert_eq!(error.to_string(), "Invalid detach action: reload");

        let error = DetachError::StopFailed("a, b".to_string());
        assert_eq!(error.to_string(), "Stop failed: a, b");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error: DetachError = io.into();
        assert!(matches!(error, DetachError::Io(_)));
    }
}
