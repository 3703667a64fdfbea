//! Crate error type for the auxiliary fallible operations.
//!
//! Failures of user code travel as [`Fault`](crate::Fault) values inside a
//! [`Maybe`](crate::Maybe); this type only covers the machinery itself.

use thiserror::Error;

/// Error type for `maybe-core` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A structured description could not be rendered as JSON.
    #[error("failed to serialize description: {reason}")]
    SerializeFailed { reason: String },

    /// A structured description nests deeper than the renderer follows.
    #[error("description nests deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    /// Text handed to [`FaultId::from_str`](crate::FaultId) is not a valid id.
    #[error("invalid fault id '{input}': {reason}")]
    InvalidFaultId { input: String, reason: String },
}

impl Error {
    /// Create a serialization error.
    pub fn serialize_failed(reason: impl Into<String>) -> Self {
        Self::SerializeFailed {
            reason: reason.into(),
        }
    }

    /// Create a nesting-depth error.
    #[must_use]
    pub const fn nesting_too_deep(limit: usize) -> Self {
        Self::NestingTooDeep { limit }
    }

    /// Create an invalid fault id error.
    pub fn invalid_fault_id(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFaultId {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for `maybe-core` operations.
pub type Result<T> = std::result::Result<T, Error>;
