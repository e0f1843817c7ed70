//! Per-query validation errors. A rejected search has no side effects.

use super::error_code::{self, ErrorCode};

/// A `search` call was rejected before scoring.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("top_k must be greater than 0")]
    ZeroTopK,

    #[error("{space} weight is not finite: {value}")]
    NonFiniteWeight { space: &'static str, value: f32 },

    #[error("{vector} vector has non-finite component at {position}")]
    NonFiniteVector { vector: String, position: usize },

    #[error("{vector} vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        vector: String,
        expected: usize,
        actual: usize,
    },

    #[error("filter `{field}` threshold is not finite")]
    NonFiniteThreshold { field: &'static str },

    #[error("filter `{field}` expects a {expected} value")]
    FilterKindMismatch {
        field: &'static str,
        expected: &'static str,
    },
}

impl ErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        error_code::VALIDATION_ERROR
    }
}

/// A filter key outside the registry. Callers warn and drop the filter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter field: {0}")]
pub struct UnknownFilterField(pub String);

impl ErrorCode for UnknownFilterField {
    fn error_code(&self) -> &'static str {
        error_code::UNKNOWN_FILTER_FIELD
    }
}
