//! SessionState: structured fields merged across conversational turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobsearch_core::models::{ExclusionTerm, Filters, Intent, SpaceWeights};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Empty,
    Active,
}

/// One entry of the append-only turn log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Raw user text.
    pub query: String,
    /// The merged intent this turn was searched with.
    pub intent: Intent,
    pub result_rows: Vec<usize>,
    pub timestamp: DateTime<Utc>,
}

/// Accumulated filters, the latest weights, and the union of exclusions.
///
/// Only `clear` forgets anything; there is no per-field unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    turns: Vec<Turn>,
    filters: Filters,
    weights: Option<SpaceWeights>,
    exclusions: Vec<ExclusionTerm>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.turns.is_empty() {
            SessionPhase::Empty
        } else {
            SessionPhase::Active
        }
    }

    /// Fold `intent` into the session and return the intent to search with.
    ///
    /// Filters merge field-wise, weights and query vectors come from this
    /// turn, exclusions accumulate (case-insensitive, first vector kept).
    pub fn apply_turn(&mut self, query: impl Into<String>, intent: Intent) -> Intent {
        let Intent {
            query: vectors,
            weights,
            filters,
            exclusions,
            semantic_query,
        } = intent;

        self.filters.merge(&filters);
        self.weights = Some(weights);
        for term in exclusions {
            if !self.has_exclusion(&term.term) {
                self.exclusions.push(term);
            }
        }

        let merged = Intent {
            query: vectors,
            weights,
            filters: self.filters.clone(),
            exclusions: self.exclusions.clone(),
            semantic_query,
        };
        self.turns.push(Turn {
            query: query.into(),
            intent: merged.clone(),
            result_rows: Vec::new(),
            timestamp: Utc::now(),
        });
        merged
    }

    /// Attach result rows to the latest turn. No-op while empty.
    pub fn record_results(&mut self, rows: Vec<usize>) {
        if let Some(turn) = self.turns.last_mut() {
            turn.result_rows = rows;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn has_exclusion(&self, term: &str) -> bool {
        let key = exclusion_key(term);
        self.exclusions.iter().any(|e| exclusion_key(&e.term) == key)
    }

    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Weights of the latest turn.
    pub fn weights(&self) -> Option<SpaceWeights> {
        self.weights
    }

    pub fn exclusions(&self) -> &[ExclusionTerm] {
        &self.exclusions
    }

    /// Intent of the latest turn, as searched.
    pub fn merged_intent(&self) -> Option<&Intent> {
        self.turns.last().map(|t| &t.intent)
    }

    /// Raw query texts, oldest first.
    pub fn queries(&self) -> Vec<String> {
        self.turns.iter().map(|t| t.query.clone()).collect()
    }
}

fn exclusion_key(term: &str) -> String {
    term.trim().to_lowercase()
}
