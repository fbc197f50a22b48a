//! Error taxonomy for the check-in domain.
//!
//! Callers map each kind to a transport status:
//!
//! | kind | meaning | HTTP |
//! |------|---------|------|
//! | [`CheckInError::InvalidArgument`] | missing or malformed input (caller bug) | 400 |
//! | [`CheckInError::NotFound`] | referenced entity does not exist | 404 |
//! | [`CheckInError::Validation`] | business rule violated | 400 |
//! | [`CheckInError::Store`] | persistence failure | 500 |
//!
//! None of these are retried automatically.

use thiserror::Error;

/// Errors raised by store implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The record addressed by an update does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// A uniqueness constraint was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored data could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(String),
}

/// Errors surfaced by check-in, validation, reporting and booth operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckInError {
    /// A required field was missing or malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced entity does not exist
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of entity
        entity: &'static str,
        /// Key that was looked up
        key: String,
    },

    /// A business rule rejected the operation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CheckInError {
    /// Shorthand for [`CheckInError::InvalidArgument`].
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Shorthand for [`CheckInError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Shorthand for [`CheckInError::Validation`].
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable code for the error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

/// Result alias for check-in operations.
pub type Result<T> = std::result::Result<T, CheckInError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = CheckInError::not_found("Attendee", "Q9");
        assert_eq!(err.to_string(), "Attendee not found: Q9");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn store_error_is_transparent() {
        let err: CheckInError = StoreError::Database("connection reset".to_string()).into();
        assert_eq!(err.to_string(), "Database error: connection reset");
        assert_eq!(err.code(), "STORE_ERROR");
    }

    #[test]
    fn validation_display() {
        let err = CheckInError::validation("Cannot check in cancelled attendee");
        assert_eq!(
            err.to_string(),
            "Validation failed: Cannot check in cancelled attendee"
        );
    }
}
