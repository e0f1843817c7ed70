use serde::{Deserialize, Serialize};

use super::filters::Filters;
use super::space::{EmbeddingSpace, SpaceWeights};

/// Query embedding(s) for the three spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryVectors {
    /// One semantic vector reused in every space.
    Shared(Vec<f32>),
    /// A dedicated vector per space.
    PerSpace {
        explicit: Vec<f32>,
        inferred: Vec<f32>,
        company: Vec<f32>,
    },
}

impl QueryVectors {
    pub fn get(&self, space: EmbeddingSpace) -> &[f32] {
        match self {
            Self::Shared(v) => v,
            Self::PerSpace {
                explicit,
                inferred,
                company,
            } => match space {
                EmbeddingSpace::Explicit => explicit,
                EmbeddingSpace::Inferred => inferred,
                EmbeddingSpace::Company => company,
            },
        }
    }
}

/// A phrase the user wants to steer away from, with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionTerm {
    pub term: String,
    pub vector: Vec<f32>,
}

impl ExclusionTerm {
    pub fn new(term: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            term: term.into(),
            vector,
        }
    }
}

/// A fully structured search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub query: QueryVectors,
    #[serde(default)]
    pub weights: SpaceWeights,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default)]
    pub exclusions: Vec<ExclusionTerm>,
    /// Free text the query vectors were embedded from; enables skill matching.
    #[serde(default)]
    pub semantic_query: Option<String>,
}

impl Intent {
    pub fn new(query: QueryVectors) -> Self {
        Self {
            query,
            weights: SpaceWeights::default(),
            filters: Filters::default(),
            exclusions: Vec::new(),
            semantic_query: None,
        }
    }

    pub fn with_weights(mut self, weights: SpaceWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_exclusion(mut self, term: ExclusionTerm) -> Self {
        self.exclusions.push(term);
        self
    }

    pub fn with_semantic_query(mut self, text: impl Into<String>) -> Self {
        self.semantic_query = Some(text.into());
        self
    }
}

/// On-disk intent document with a loosely-typed filter map.
///
/// `into_intent` routes the filters through `Filters::from_raw`, so unknown
/// keys are warned about and dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentDocument {
    pub query: QueryVectors,
    #[serde(default)]
    pub weights: Option<SpaceWeights>,
    #[serde(default)]
    pub filters: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub exclusions: Vec<ExclusionTerm>,
    #[serde(default)]
    pub semantic_query: Option<String>,
}

impl IntentDocument {
    /// `default_weights` applies when the document names none.
    pub fn into_intent(self, default_weights: SpaceWeights) -> Intent {
        Intent {
            query: self.query,
            weights: self.weights.unwrap_or(default_weights).clamped(),
            filters: Filters::from_raw(&self.filters),
            exclusions: self.exclusions,
            semantic_query: self.semantic_query,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterField;

    #[test]
    fn document_accepts_shared_and_per_space_queries() {
        let shared: IntentDocument =
            serde_json::from_str(r#"{"query": [1.0, 0.0]}"#).expect("shared");
        assert_eq!(shared.query, QueryVectors::Shared(vec![1.0, 0.0]));

        let per_space: IntentDocument = serde_json::from_str(
            r#"{"query": {"explicit": [1.0], "inferred": [0.5], "company": [0.0]}}"#,
        )
        .expect("per space");
        assert_eq!(per_space.query.get(EmbeddingSpace::Inferred), &[0.5]);
    }

    #[test]
    fn document_defaults_weights_and_drops_unknown_filters() {
        let doc: IntentDocument = serde_json::from_str(
            r#"{"query": [1.0], "filters": {"remote_type": "remote", "vibe": "chill"}}"#,
        )
        .expect("doc");
        let intent = doc.into_intent(SpaceWeights::default());
        assert_eq!(intent.weights, SpaceWeights::default());
        assert_eq!(intent.filters.len(), 1);
        assert!(intent.filters.get(FilterField::RemoteType).is_some());
    }

    #[test]
    fn negative_document_weights_clamp() {
        let doc: IntentDocument = serde_json::from_str(
            r#"{"query": [1.0], "weights": {"explicit": -1.0, "inferred": 0.4, "company": 0.1}}"#,
        )
        .expect("doc");
        let intent = doc.into_intent(SpaceWeights::default());
        assert_eq!(intent.weights.explicit, 0.0);
        assert_eq!(intent.weights.inferred, 0.4);
    }
}
