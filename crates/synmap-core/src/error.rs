//! Error types for mapping passes

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for mapping operations
///
/// Only structural faults are errors. A fact that no rule could resolve is not
/// an error; it stays in the fact table carrying its original diagnostic.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A path string could not be parsed, or an operation needed an element
    /// the path does not have
    #[error("Malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// A rule was invoked with inputs it cannot work with
    #[error("Rule error in '{rule_id}': {message}")]
    RuleError { rule_id: String, message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Path,
    Config,
    Rule,
    Io,
    Internal,
}

impl MappingError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MappingError::MalformedPath { .. } => ErrorKind::Path,
            MappingError::ConfigError { .. } => ErrorKind::Config,
            MappingError::RuleError { .. } => ErrorKind::Rule,
            MappingError::IoError { .. } => ErrorKind::Io,
            MappingError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (other documents can still be processed)
    ///
    /// A malformed path aborts the pass of the document it came from, but a
    /// batch keeps going with the next document.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Path | ErrorKind::Rule)
    }

    /// Create a malformed path error
    pub fn malformed_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a rule error
    pub fn rule_error(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleError {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
