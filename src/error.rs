use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for change-revision operations
#[derive(Error, Debug)]
pub enum ChangeRevisionError {
    #[error("Version control client not found: {0}")]
    ClientNotFound(String),

    #[error("Executable search path unavailable: {0}")]
    SearchPathUnavailable(String),

    #[error("Failed to start '{program}': {source}")]
    ProcessStart {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed version: {0}")]
    MalformedVersion(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Unsupported project format: {0}")]
    UnsupportedFormat(String),

    #[error("Revision count out of range: {0}")]
    OutOfRange(String),

    #[error("Project directory not found: {0}")]
    MissingProjectDirectory(String),

    #[error("Insufficient arguments: {0}")]
    InsufficientArguments(String),

    #[error("Not on primary branch '{0}'")]
    NotOnPrimaryBranch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in change-revision
pub type Result<T> = std::result::Result<T, ChangeRevisionError>;

impl ChangeRevisionError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ChangeRevisionError::Config(msg.into())
    }

    /// Create a malformed version error with context
    pub fn malformed(msg: impl Into<String>) -> Self {
        ChangeRevisionError::MalformedVersion(msg.into())
    }

    /// Create a missing element error with context
    pub fn missing_element(msg: impl Into<String>) -> Self {
        ChangeRevisionError::MissingElement(msg.into())
    }

    /// Create an unsupported format error with context
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        ChangeRevisionError::UnsupportedFormat(msg.into())
    }

    /// Create a client not found error with context
    pub fn client_not_found(msg: impl Into<String>) -> Self {
        ChangeRevisionError::ClientNotFound(msg.into())
    }
}
