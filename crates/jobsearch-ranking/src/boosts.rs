//! Additive confirmation boosts for rows that survived filtering.

use jobsearch_core::config::RankingConfig;
use jobsearch_core::models::{Boost, FilterField, FilterValue, Intent};
use jobsearch_index::MetadataTable;

/// Boosts that apply to one intent, resolved once per search.
#[derive(Debug, Clone, Default)]
pub struct BoostPlan {
    salary: Option<(f64, f32)>,
    skill_tokens: Vec<String>,
    skill_amount: f32,
    skill_cap: usize,
}

impl BoostPlan {
    pub fn new(intent: &Intent, config: &RankingConfig) -> Self {
        let salary = match intent.filters.get(FilterField::MinSalary) {
            Some(FilterValue::NumericLowerBound(threshold)) if config.salary_confirmation_boost > 0.0 => {
                Some((*threshold, config.salary_confirmation_boost))
            }
            _ => None,
        };

        let skill_tokens = match intent.semantic_query.as_deref() {
            Some(text) if config.skill_match_boost > 0.0 && config.skill_match_cap > 0 => {
                query_tokens(text)
            }
            _ => Vec::new(),
        };

        Self {
            salary,
            skill_tokens,
            skill_amount: config.skill_match_boost,
            skill_cap: config.skill_match_cap,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.salary.is_none() && self.skill_tokens.is_empty()
    }

    /// Sum of every boost `row` earns.
    pub fn total(&self, table: &MetadataTable, row: usize) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        self.explain(table, row).iter().map(Boost::amount).sum()
    }

    pub fn explain(&self, table: &MetadataTable, row: usize) -> Vec<Boost> {
        let mut boosts = Vec::new();

        if let Some((threshold, amount)) = self.salary {
            let confirmed = table
                .salary_min()
                .get(row)
                .copied()
                .flatten()
                .is_some_and(|min| min >= threshold);
            if confirmed {
                boosts.push(Boost::SalaryConfirmed { amount });
            }
        }

        if !self.skill_tokens.is_empty() {
            let matches = table
                .required_skills(row)
                .iter()
                .filter(|skill| {
                    let skill = skill.trim().to_lowercase();
                    self.skill_tokens.iter().any(|t| *t == skill)
                })
                .count()
                .min(self.skill_cap);
            if matches > 0 {
                boosts.push(Boost::SkillMatch {
                    matches,
                    amount: self.skill_amount * matches as f32,
                });
            }
        }

        boosts
    }
}

/// Lowercased whitespace tokens with surrounding punctuation trimmed.
/// Inner punctuation stays so "c++" and "node.js" survive.
fn query_tokens(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = text
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| matches!(c, ',' | '.' | ';' | ':' | '!' | '?' | '(' | ')' | '"' | '\''))
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}
