use serde::{Deserialize, Serialize};

use super::filters::FilterField;

/// An additive bonus applied to a row's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Boost {
    /// `salary_min` meets an active minimum-salary filter.
    SalaryConfirmed { amount: f32 },
    /// Required skills named in the semantic query.
    SkillMatch { matches: usize, amount: f32 },
}

impl Boost {
    pub fn amount(&self) -> f32 {
        match self {
            Self::SalaryConfirmed { amount } | Self::SkillMatch { amount, .. } => *amount,
        }
    }
}

/// One ranked row with a breakdown of how its score came together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub row: usize,
    /// `similarity - exclusion_penalty + sum(boosts)`.
    pub score: f32,
    /// Weighted multi-space cosine similarity.
    pub similarity: f32,
    /// Amount subtracted for exclusion terms (already scaled).
    pub exclusion_penalty: f32,
    pub boosts: Vec<Boost>,
    /// Active filters this row satisfied on a non-null value.
    pub matched_filters: Vec<FilterField>,
    /// Active filters this row passed only because its value is missing.
    pub null_filters: Vec<FilterField>,
}

/// Counters describing one search.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchMeta {
    pub total_rows: usize,
    pub passed_filters: usize,
    pub returned: usize,
    pub elapsed_ms: f64,
}

/// Results plus metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub results: Vec<RankedResult>,
    pub meta: SearchMeta,
}

impl SearchOutcome {
    pub fn rows(&self) -> Vec<usize> {
        self.results.iter().map(|r| r.row).collect()
    }
}
