//! Error types for the catalog
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! The taxonomy separates three failure classes:
//! - Input contract violations (`Validation`, `InvalidKey`, `DimensionMismatch`,
//!   `NonFiniteValue`, `DuplicateKeyInBatch`, `ChangesetRejected`): the caller
//!   must fix the input.
//! - Data integrity faults (`MultipleMatches`, `UniqueViolation`): the stored
//!   data violates an invariant and needs operator attention.
//! - Backend failures (`Store`, `Serialization`, `RecordNotFound`): propagated
//!   from the record store unchanged.

use crate::issue::Issue;
use crate::types::Table;
use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the catalog
#[derive(Debug, Error)]
pub enum Error {
    /// A component aggregate failed semantic validation
    #[error("Validation failed: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A changeset document could not be parsed against its declared shape
    #[error("Malformed changeset: {message}")]
    Malformed {
        /// Parse failure detail
        message: String,
    },

    /// A changeset carried error-severity issues and was not applied
    #[error("Changeset rejected: {}", format_issues(errors))]
    ChangesetRejected {
        /// Every error-severity issue found during validation
        errors: Vec<Issue>,
    },

    /// A key was empty after trimming surrounding whitespace
    #[error("Invalid key: {key:?} (must be non-empty after trimming)")]
    InvalidKey {
        /// The offending raw key
        key: String,
    },

    /// An embedding vector had the wrong number of dimensions
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Required dimension count
        expected: usize,
        /// Actual dimension count of the provided vector
        got: usize,
    },

    /// An embedding vector contained a NaN or infinite value
    #[error("Non-finite value at index {index}")]
    NonFiniteValue {
        /// Index of the first non-finite element
        index: usize,
    },

    /// Two entries in one batch resolved to the same key
    #[error("Duplicate key in batch: {key:?}")]
    DuplicateKeyInBatch {
        /// The key shared by more than one entry
        key: String,
    },

    /// A unique-key lookup matched more than one row
    #[error("Multiple rows match {field} = {key:?} in table {table}")]
    MultipleMatches {
        /// Table that holds the conflicting rows
        table: Table,
        /// Field the lookup ran against
        field: String,
        /// Key value that matched more than once
        key: String,
    },

    /// A write would have created a second row with an existing unique key
    #[error("Unique key violation: {key:?} already exists in table {table}")]
    UniqueViolation {
        /// Table that enforces the constraint
        table: Table,
        /// The duplicated key
        key: String,
    },

    /// A record id did not resolve to a stored row
    #[error("Record not found: {id}")]
    RecordNotFound {
        /// Rendered record id (table/sequence)
        id: String,
    },

    /// Record store error
    #[error("Store error: {message}")]
    Store {
        /// Backend failure detail
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Conversion failure detail
        message: String,
    },
}

impl Error {
    /// Check if this error means the caller's input must change.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. }
                | Error::Malformed { .. }
                | Error::ChangesetRejected { .. }
                | Error::InvalidKey { .. }
                | Error::DimensionMismatch { .. }
                | Error::NonFiniteValue { .. }
                | Error::DuplicateKeyInBatch { .. }
        )
    }

    /// Check if this error means stored data violates an invariant.
    pub fn is_integrity_fault(&self) -> bool {
        matches!(
            self,
            Error::MultipleMatches { .. } | Error::UniqueViolation { .. }
        )
    }

    /// Check if this error came from the record store backend.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Error::Store { .. } | Error::Serialization { .. } | Error::RecordNotFound { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization {
            message: e.to_string(),
        }
    }
}

fn format_issues(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return "no issues recorded".to_string();
    }
    let rendered: Vec<String> = issues.iter().map(|issue| issue.to_string()).collect();
    format!("{} error(s): {}", issues.len(), rendered.join("; "))
}
