//! Record parsing errors. Always per-row and never fatal to a build.

use super::error_code::{self, ErrorCode};

/// A single raw posting could not be turned into a `JobRecord`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("line {ordinal}: invalid JSON: {message}")]
    InvalidJson { ordinal: u64, message: String },

    #[error("record {ordinal}: missing identity field `{field}`")]
    MissingIdentity { ordinal: u64, field: &'static str },

    #[error("record {ordinal}: missing {space} embedding")]
    MissingEmbedding { ordinal: u64, space: &'static str },

    #[error("record {ordinal}: {space} embedding has non-finite component at {position}")]
    NonFiniteEmbedding {
        ordinal: u64,
        space: &'static str,
        position: usize,
    },

    #[error("record {ordinal}: {space} embedding has zero norm")]
    ZeroNormEmbedding { ordinal: u64, space: &'static str },

    #[error("record {ordinal}: embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        ordinal: u64,
        expected: usize,
        actual: usize,
    },
}

impl ParseError {
    /// Position of the offending record in its input stream.
    pub fn ordinal(&self) -> u64 {
        match self {
            Self::InvalidJson { ordinal, .. }
            | Self::MissingIdentity { ordinal, .. }
            | Self::MissingEmbedding { ordinal, .. }
            | Self::NonFiniteEmbedding { ordinal, .. }
            | Self::ZeroNormEmbedding { ordinal, .. }
            | Self::DimensionMismatch { ordinal, .. } => *ordinal,
        }
    }
}

impl ErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        error_code::PARSE_ERROR
    }
}
