//! Umbrella error type

use super::{ApiError, AuthError};
use thiserror::Error;

/// Result type alias for academy operations
pub type AcademyResult<T> = Result<T, AcademyError>;

/// Top-level error for operations that cross component boundaries
#[derive(Error, Debug, Clone)]
pub enum AcademyError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Classified API client failure
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Translated session store failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Session persistence errors
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        path: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json { message: String },
}

impl AcademyError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context about where it happened
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            path: None,
        }
    }

    /// Create a storage error tied to a path
    pub fn storage_at(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Human readable text suitable for a notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(error) => error.user_message(),
            Self::Auth(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for AcademyError {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for AcademyError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json {
            message: error.to_string(),
        }
    }
}
