//! Index build and open errors.

use std::path::PathBuf;

use super::error_code::{self, ErrorCode};

/// Errors raised while building, publishing, or opening index artifacts.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("index corrupt: {details}")]
    IndexCorrupt { details: String },

    #[error("another build holds the lock on {path}")]
    BuildLocked { path: PathBuf },

    #[error("input changed between build passes: {details}")]
    InputChanged { details: String },

    #[error("no valid records survived the build ({malformed} malformed)")]
    EmptyCorpus { malformed: u64 },

    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl IndexError {
    /// Wrap an `io::Error` with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Shorthand for a corrupt-index error.
    pub fn corrupt(details: impl Into<String>) -> Self {
        Self::IndexCorrupt {
            details: details.into(),
        }
    }
}

impl ErrorCode for IndexError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } | Self::Serialization { .. } => error_code::INDEX_IO,
            Self::IndexCorrupt { .. } => error_code::INDEX_CORRUPT,
            Self::BuildLocked { .. } => error_code::BUILD_LOCKED,
            Self::InputChanged { .. } => error_code::INPUT_CHANGED,
            Self::EmptyCorpus { .. } => error_code::EMPTY_CORPUS,
        }
    }
}
