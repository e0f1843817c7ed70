use serde::{Deserialize, Serialize};

use crate::errors::CollaboratorError;
use crate::models::{Filters, SpaceWeights};

/// Structured reading of one user utterance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedIntent {
    /// Text to embed as the query.
    pub semantic_query: String,
    #[serde(default)]
    pub filters: Filters,
    /// `None` falls back to the configured default weights.
    #[serde(default)]
    pub weights: Option<SpaceWeights>,
    /// Phrases to steer away from.
    #[serde(default)]
    pub exclusions: Vec<String>,
}

/// Turns free text into structured intent. Implemented upstream (LLM or regex).
pub trait IIntentExtractor: Send + Sync {
    /// `history` holds the raw queries of earlier turns, oldest first.
    fn extract(&self, query: &str, history: &[String]) -> Result<ExtractedIntent, CollaboratorError>;
}

/// Query-text embedding provider.
pub trait IQueryEmbedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError>;

    /// Dimensionality of produced vectors.
    fn dimensions(&self) -> usize;
}
