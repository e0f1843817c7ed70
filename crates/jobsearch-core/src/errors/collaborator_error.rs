//! Failures reported by upstream collaborators (intent extraction, query embedding).

use super::error_code::{self, ErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("intent extraction failed: {reason}")]
    IntentExtraction { reason: String },

    #[error("embedding failed for {text:?}: {reason}")]
    Embedding { text: String, reason: String },
}

impl ErrorCode for CollaboratorError {
    fn error_code(&self) -> &'static str {
        error_code::COLLABORATOR_ERROR
    }
}
