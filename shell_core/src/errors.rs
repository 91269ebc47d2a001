//! # Error Types
//!
//! Structured error types for shell_core. Only the fallible edges of the crate
//! produce these: registering a shell under the `Reject` duplicate policy and
//! loading configuration. Callback invocation never fails; see
//! [`crate::callback::Delivery`] for how it reports what happened instead.
//!
//! ## Example
//!
//! ```rust
//! use shell_core::errors::{ShellError, ShellResult};
//!
//! fn require_policy(name: &str) -> ShellResult<()> {
//!     if name.is_empty() {
//!         return Err(ShellError::invalid_config("duplicate_policy", "policy name is empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_policy("").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::TypeTag;

/// Result type alias for shell_core operations
pub type ShellResult<T> = Result<T, ShellError>;

/// Structured error type for registry and configuration operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum ShellError {
    /// A second live instance of a singleton shell type was constructed
    /// while the registry is configured to reject duplicates.
    #[error("Duplicate registration: {type_name} ({tag}) already has a live instance")]
    DuplicateRegistration { type_name: String, tag: TypeTag },

    /// A configuration value is invalid
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl ShellError {
    /// Create a DuplicateRegistration error
    pub fn duplicate_registration(type_name: impl Into<String>, tag: TypeTag) -> Self {
        ShellError::DuplicateRegistration {
            type_name: type_name.into(),
            tag,
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ShellError::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        ShellError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        ShellError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error.
    ///
    /// A rejected duplicate clears up once the existing instance is dropped.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ShellError::DuplicateRegistration { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ShellError::DuplicateRegistration { .. } => "DUPLICATE_REGISTRATION",
            ShellError::InvalidConfig { .. } => "INVALID_CONFIG",
            ShellError::FileError { .. } => "FILE_ERROR",
            ShellError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for ShellError {
    fn from(err: serde_json::Error) -> Self {
        ShellError::serialization(err.to_string())
    }
}
