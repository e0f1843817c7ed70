//! Error handling for jobsearch.
//! One error enum per subsystem, `thiserror` only. `anyhow` stays at the binary edge.

pub mod collaborator_error;
pub mod config_error;
pub mod error_code;
pub mod index_error;
pub mod parse_error;
pub mod validation_error;

pub use collaborator_error::CollaboratorError;
pub use config_error::ConfigError;
pub use error_code::ErrorCode;
pub use index_error::IndexError;
pub use parse_error::ParseError;
pub use validation_error::{UnknownFilterField, ValidationError};

/// Top-level error aggregating all subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum JobSearchError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),
}

impl ErrorCode for JobSearchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(e) => e.error_code(),
            Self::Index(e) => e.error_code(),
            Self::Validation(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Collaborator(e) => e.error_code(),
        }
    }
}

/// Convenience alias used across the workspace.
pub type JobSearchResult<T> = Result<T, JobSearchError>;
