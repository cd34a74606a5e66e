//! Error types for memdex core.

use crate::types::RecordId;
use crate::value::FieldKind;
use std::time::Duration;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in memdex core operations.
///
/// The set is closed: every failure the store, the index manager or the
/// query engine can report is one of these variants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Identifier was never assigned.
    #[error("record not found: {id}")]
    NotFound {
        /// The identifier that was looked up.
        id: RecordId,
    },

    /// Identifier resolves to a tombstoned record.
    #[error("record has been deleted: {id}")]
    RecordDeleted {
        /// The identifier of the deleted record.
        id: RecordId,
    },

    /// Malformed pagination bounds or condition shape.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of what was wrong.
        message: String,
    },

    /// A condition targets a field with no registered index.
    #[error("field not indexed: {field}")]
    FieldNotIndexed {
        /// Name of the field.
        field: String,
    },

    /// A condition needs a matching mode the field was not registered with.
    #[error("field {field} does not support {mode} lookups")]
    UnsupportedIndexForField {
        /// Name of the field.
        field: String,
        /// The matching mode that was requested.
        mode: &'static str,
    },

    /// A literal cannot be coerced to the field's value kind.
    #[error("cannot convert {from} to {to}")]
    TypeConversion {
        /// Kind of the literal.
        from: FieldKind,
        /// Kind the field was declared with.
        to: FieldKind,
    },

    /// A value kind has no canonical string representation.
    #[error("{kind} values cannot be converted to a string key")]
    TypeUnsupported {
        /// The offending kind.
        kind: FieldKind,
    },

    /// Two values of different or unordered kinds were compared.
    #[error("cannot compare {left} with {right}")]
    IncomparableTypes {
        /// Kind of the left operand.
        left: FieldKind,
        /// Kind of the right operand.
        right: FieldKind,
    },

    /// No member of a membership condition matched any record.
    #[error("no matching entries for membership condition on field {field}")]
    NoMatches {
        /// Name of the field.
        field: String,
    },

    /// Query did not complete within its bound.
    #[error("query deadline exceeded after {timeout:?}")]
    DeadlineExceeded {
        /// The configured bound.
        timeout: Duration,
    },

    /// Query was cancelled by the caller.
    #[error("query cancelled")]
    Cancelled,
}

impl CoreError {
    /// Creates a not found error.
    pub fn not_found(id: RecordId) -> Self {
        Self::NotFound { id }
    }

    /// Creates a record deleted error.
    pub fn record_deleted(id: RecordId) -> Self {
        Self::RecordDeleted { id }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a field not indexed error.
    pub fn field_not_indexed(field: impl Into<String>) -> Self {
        Self::FieldNotIndexed {
            field: field.into(),
        }
    }

    /// Creates an unsupported index error.
    pub fn unsupported_index(field: impl Into<String>, mode: &'static str) -> Self {
        Self::UnsupportedIndexForField {
            field: field.into(),
            mode,
        }
    }

    /// Creates a no matches error.
    pub fn no_matches(field: impl Into<String>) -> Self {
        Self::NoMatches {
            field: field.into(),
        }
    }

    /// Returns true if the identifier was never assigned.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the identifier belongs to a tombstoned record.
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::RecordDeleted { .. })
    }

    /// Returns true if a query stopped early because of its deadline or
    /// a cancellation request.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. } | Self::Cancelled)
    }
}
