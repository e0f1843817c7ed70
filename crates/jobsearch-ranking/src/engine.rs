//! RankingEngine: validates an intent, scores every row, returns the top k.
//!
//! Pipeline: validation → weighted similarity → exclusion penalty →
//! null-safe filters → boosts → partial top-k → explanation.

use std::sync::Arc;
use std::time::Instant;

use jobsearch_core::config::RankingConfig;
use jobsearch_core::errors::ValidationError;
use jobsearch_core::models::{Intent, RankedResult, SearchMeta, SearchOutcome};
use jobsearch_core::search_span;
use jobsearch_index::EmbeddingIndex;
use rayon::prelude::*;
use tracing::debug;

use crate::boosts::BoostPlan;
use crate::filters::FilterPlan;
use crate::scoring::{exclusion_strength, weighted_similarity};
use crate::selection::select_top_k;
use crate::validation::validate;

/// Stateless ranking over one published index. Cheap to clone and safe to
/// share across threads; every search reads the index without mutation.
#[derive(Debug, Clone)]
pub struct RankingEngine {
    index: Arc<EmbeddingIndex>,
    config: RankingConfig,
}

impl RankingEngine {
    pub fn new(index: Arc<EmbeddingIndex>, config: RankingConfig) -> Self {
        Self { index, config }
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Top `top_k` rows for `intent`, best first, ties broken by ascending row.
    pub fn search(&self, intent: &Intent, top_k: usize) -> Result<Vec<RankedResult>, ValidationError> {
        self.search_with_meta(intent, top_k).map(|outcome| outcome.results)
    }

    /// `search` with the configured default result count.
    pub fn search_default(&self, intent: &Intent) -> Result<Vec<RankedResult>, ValidationError> {
        self.search(intent, self.config.default_top_k)
    }

    pub fn search_with_meta(&self, intent: &Intent, top_k: usize) -> Result<SearchOutcome, ValidationError> {
        let rows = self.index.rows();
        let _span = search_span!(rows, top_k).entered();
        let start = Instant::now();

        validate(intent, top_k, self.index.dims())?;

        let similarity = weighted_similarity(&self.index, &intent.query, intent.weights)?;
        let exclusion = exclusion_strength(&self.index, &intent.exclusions, self.config.exclusion_scope)?;

        let table = self.index.table();
        let filters = FilterPlan::compile(&intent.filters, table);
        let boosts = BoostPlan::new(intent, &self.config);
        let penalty = self.config.exclusion_penalty;

        let scored: Vec<(usize, f32)> = (0..rows)
            .into_par_iter()
            .filter(|row| filters.passes(*row))
            .map(|row| {
                let excluded = exclusion.as_ref().map_or(0.0, |ex| penalty * ex[row]);
                let score = similarity[row] - excluded + boosts.total(table, row);
                (row, score)
            })
            .collect();
        let passed = scored.len();

        let results: Vec<RankedResult> = select_top_k(scored, top_k)
            .into_iter()
            .map(|(row, score)| {
                let (matched_filters, null_filters) = filters.explain(row);
                RankedResult {
                    row,
                    score,
                    similarity: similarity[row],
                    exclusion_penalty: exclusion.as_ref().map_or(0.0, |ex| penalty * ex[row]),
                    boosts: boosts.explain(table, row),
                    matched_filters,
                    null_filters,
                }
            })
            .collect();

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            rows,
            passed_filters = passed,
            returned = results.len(),
            exclusions = intent.exclusions.len(),
            elapsed_ms,
            "search complete"
        );

        Ok(SearchOutcome {
            meta: SearchMeta {
                total_rows: rows,
                passed_filters: passed,
                returned: results.len(),
                elapsed_ms,
            },
            results,
        })
    }
}
