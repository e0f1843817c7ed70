use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::SpaceWeights;

/// Which embedding spaces exclusion terms are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionScope {
    /// Only the inferred space.
    #[default]
    Inferred,
    /// Maximum over all three spaces.
    AllSpaces,
}

/// Ranking engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Result count when the caller does not ask for one.
    pub default_top_k: usize,
    /// Coefficient applied to the strongest exclusion similarity.
    pub exclusion_penalty: f32,
    /// Spaces exclusion terms are compared against.
    pub exclusion_scope: ExclusionScope,
    /// Added when `salary_min` confirms an active minimum-salary filter.
    pub salary_confirmation_boost: f32,
    /// Added per required skill named in the semantic query. 0 disables.
    pub skill_match_boost: f32,
    /// Maximum number of skill matches that earn a boost.
    pub skill_match_cap: usize,
    /// Weights used when the upstream intent carries none.
    pub default_weights: SpaceWeights,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_top_k: defaults::DEFAULT_TOP_K,
            exclusion_penalty: defaults::DEFAULT_EXCLUSION_PENALTY,
            exclusion_scope: ExclusionScope::default(),
            salary_confirmation_boost: defaults::DEFAULT_SALARY_CONFIRMATION_BOOST,
            skill_match_boost: defaults::DEFAULT_SKILL_MATCH_BOOST,
            skill_match_cap: defaults::DEFAULT_SKILL_MATCH_CAP,
            default_weights: SpaceWeights::default(),
        }
    }
}
