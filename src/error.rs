//! Error types for fs-walker
//!
//! This module defines the error hierarchy for the crate:
//! - Storage I/O errors (stat, directory listing, file read)
//! - Configuration and CLI errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Every I/O failure carries the path it failed on
//! - Preserve error chains for debugging

use thiserror::Error;

/// Top-level error type for the fs-walker application
#[derive(Error, Debug)]
pub enum WalkerError {
    /// Storage I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Storage operation errors
///
/// The traversal engines produce no other error kind: a walk either
/// resolves with its accumulated entries or with the first `IoError`
/// observed. Errors are never retried.
#[derive(Error, Debug)]
pub enum IoError {
    /// Stat operation failed
    #[error("Failed to stat '{path}': {source}")]
    Stat {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Directory listing failed
    #[error("Failed to read directory '{path}': {source}")]
    List {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File read failed
    #[error("Failed to read file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl IoError {
    /// The path the failing operation was issued against
    pub fn path(&self) -> &str {
        match self {
            IoError::Stat { path, .. } => path,
            IoError::List { path, .. } => path,
            IoError::Read { path, .. } => path,
        }
    }

    /// The kind of the underlying I/O error
    pub fn source_kind(&self) -> std::io::ErrorKind {
        match self {
            IoError::Stat { source, .. } => source.kind(),
            IoError::List { source, .. } => source.kind(),
            IoError::Read { source, .. } => source.kind(),
        }
    }

    /// Check if this error is a missing-path error
    ///
    /// Not-found errors are common on filesystems that change during a
    /// scan, so the engines log them at a lower level.
    pub fn is_not_found(&self) -> bool {
        self.source_kind() == std::io::ErrorKind::NotFound
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid match pattern
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// --read given without a pattern to select files
    #[error("Reading file contents requires a match pattern")]
    ReadWithoutPattern,
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;

/// Result type alias for IoError
pub type IoResult<T> = std::result::Result<T, IoError>;
