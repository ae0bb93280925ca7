//! Error types for the MIDlet library.
//!
//! Every fallible operation returns [`MidletError`]. The scanner and the
//! recent-shortcut path turn these into log lines; everything else hands them
//! back to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the MIDlet library.
#[derive(Debug, Error)]
pub enum MidletError {
    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    // Application directory errors
    #[error("No compiled artifact in {dir}")]
    MissingArtifact { dir: PathBuf },

    #[error("Invalid descriptor {path}: {message}")]
    DescriptorInvalid { path: PathBuf, message: String },

    #[error("Application not found: {path}")]
    AppNotFound { path: String },

    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Icon errors
    #[error("Image error: {message}")]
    Image {
        message: String,
        #[source]
        source: Option<image::ImageError>,
    },

    // Shortcut platform errors
    #[error("Shortcut error: {message}")]
    Shortcut { message: String },

    #[error("Failed to lock {path}: {message}")]
    LockFailed { path: PathBuf, message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for MIDlet library operations.
pub type Result<T> = std::result::Result<T, MidletError>;

// Conversion implementations for common error types

impl From<std::io::Error> for MidletError {
    fn from(err: std::io::Error) -> Self {
        MidletError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for MidletError {
    fn from(err: serde_json::Error) -> Self {
        MidletError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for MidletError {
    fn from(err: rusqlite::Error) -> Self {
        MidletError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<image::ImageError> for MidletError {
    fn from(err: image::ImageError) -> Self {
        MidletError::Image {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl MidletError {
    /// Build an [`MidletError::Io`] that remembers which path failed.
    pub fn io_at(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        MidletError::Io {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }
}
