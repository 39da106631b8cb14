//! Error types shared across facecursor crates.

use std::path::PathBuf;

/// Top-level error type for facecursor operations.
#[derive(Debug, thiserror::Error)]
pub enum FacecursorError {
    #[error("Tracking error: {message}")]
    Tracking { message: String },

    #[error("Calibration error: {message}")]
    Calibration { message: String },

    #[error("Pointer error: {message}")]
    Pointer { message: String },

    #[error("Dictation error: {message}")]
    Dictation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using FacecursorError.
pub type FacecursorResult<T> = Result<T, FacecursorError>;

impl FacecursorError {
    pub fn tracking(msg: impl Into<String>) -> Self {
        Self::Tracking {
            message: msg.into(),
        }
    }

    pub fn calibration(msg: impl Into<String>) -> Self {
        Self::Calibration {
            message: msg.into(),
        }
    }

    pub fn pointer(msg: impl Into<String>) -> Self {
        Self::Pointer {
            message: msg.into(),
        }
    }

    pub fn dictation(msg: impl Into<String>) -> Self {
        Self::Dictation {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
