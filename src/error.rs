//! Error types for the note index.
//!
//! This module defines custom error types using `thiserror` for precise error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by note sources (file trees, bookmark databases, remote services).
#[derive(Error, Debug)]
pub enum SourceError {
    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Target item already exists, creation refused
    #[error("\"{0}\" already exists, cannot create new item")]
    AlreadyExists(String),

    /// Operation not available on this backend
    #[error("{0}")]
    Unsupported(String),

    /// Item could not be located in the backend
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Bookmark database failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Blocking task panicked or was cancelled
    #[error("Task join error: {0}")]
    TaskFailed(String),
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unsupported(reason: &str) -> Self {
        SourceError::Unsupported(reason.to_string())
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    /// Notebook file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Notebook file is not valid TOML
    #[error("Failed to parse notebook file: {0}")]
    Parse(String),

    /// Section names a source kind nobody implements
    #[error("Unknown source kind \"{kind}\" in section [{section}]")]
    UnknownSource { section: String, kind: String },
}

/// Convenience type alias for Results with SourceError
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
