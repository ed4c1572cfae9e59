//! # Error Types
//!
//! Structured error types for compare_core. Only widget construction hands an
//! error back to the caller; every other problem is either a silent no-op or
//! a diagnostic reported through `tracing`. The enum still serializes so a
//! host page can receive it as JSON.
//!
//! ## Example
//!
//! ```rust
//! use compare_core::errors::{CompareError, CompareResult};
//!
//! fn require_url(url: &str) -> CompareResult<()> {
//!     if url.trim().is_empty() {
//!         return Err(CompareError::invalid_input("url", url, "URL must not be empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_url("").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for compare_core operations
pub type CompareResult<T> = Result<T, CompareError>;

/// Structured error type for comparator operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CompareError {
    /// The mount target handed to the constructor does not exist
    #[error("Container element with id \"{container_id}\" not found")]
    ContainerNotFound { container_id: String },

    /// An input value is invalid (empty URL, negative dimension, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// An imperative call reached an instance with no live binding
    #[error("Comparator {instance_id} is not mounted (operation: {operation})")]
    NotMounted {
        instance_id: String,
        operation: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CompareError {
    /// Create a ContainerNotFound error
    pub fn container_not_found(container_id: impl Into<String>) -> Self {
        CompareError::ContainerNotFound {
            container_id: container_id.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CompareError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a NotMounted error
    pub fn not_mounted(instance_id: impl Into<String>, operation: impl Into<String>) -> Self {
        CompareError::NotMounted {
            instance_id: instance_id.into(),
            operation: operation.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CompareError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Whether construction must abort on this error.
    ///
    /// Everything else is reported and swallowed by the imperative bridge.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CompareError::ContainerNotFound { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CompareError::ContainerNotFound { .. } => "CONTAINER_NOT_FOUND",
            CompareError::InvalidInput { .. } => "INVALID_INPUT",
            CompareError::NotMounted { .. } => "NOT_MOUNTED",
            CompareError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CompareError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CompareError {
    fn from(err: serde_json::Error) -> Self {
        CompareError::serialization(err.to_string())
    }
}
