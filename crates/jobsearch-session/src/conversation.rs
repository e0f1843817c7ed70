//! ConversationalSearch: one user turn from raw text to ranked results.
//!
//! extract intent → embed query and new exclusions → merge into a copy of
//! the session → rank → record result rows → commit. Collaborator and
//! validation failures leave the session exactly as it was. A turn that loses
//! a commit race to another turn on the same session is recomputed.

use std::sync::Arc;

use jobsearch_core::errors::JobSearchError;
use jobsearch_core::models::{ExclusionTerm, Intent, QueryVectors, SearchOutcome};
use jobsearch_core::traits::{IIntentExtractor, IQueryEmbedder};
use jobsearch_core::turn_span;
use jobsearch_ranking::RankingEngine;
use tracing::{debug, info};

use crate::manager::SessionManager;
use crate::state::SessionState;

pub struct ConversationalSearch {
    extractor: Arc<dyn IIntentExtractor>,
    embedder: Arc<dyn IQueryEmbedder>,
    engine: RankingEngine,
    sessions: SessionManager,
}

impl ConversationalSearch {
    pub fn new(
        extractor: Arc<dyn IIntentExtractor>,
        embedder: Arc<dyn IQueryEmbedder>,
        engine: RankingEngine,
        sessions: SessionManager,
    ) -> Self {
        Self {
            extractor,
            embedder,
            engine,
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn engine(&self) -> &RankingEngine {
        &self.engine
    }

    /// Run a turn with the engine's default result count.
    pub fn turn(&self, session_id: &str, query: &str) -> Result<SearchOutcome, JobSearchError> {
        self.turn_with_top_k(session_id, query, self.engine.config().default_top_k)
    }

    pub fn turn_with_top_k(
        &self,
        session_id: &str,
        query: &str,
        top_k: usize,
    ) -> Result<SearchOutcome, JobSearchError> {
        loop {
            let (prior, revision) = self.sessions.snapshot_with_revision(session_id);
            let _span = turn_span!(session_id, prior.history().len() + 1).entered();

            let (next, outcome) = self.run_turn(prior, query, top_k)?;
            if self.sessions.commit(session_id, revision, next) {
                info!(
                    returned = outcome.meta.returned,
                    passed_filters = outcome.meta.passed_filters,
                    elapsed_ms = outcome.meta.elapsed_ms,
                    "turn complete"
                );
                return Ok(outcome);
            }
            debug!("session changed during turn, recomputing");
        }
    }

    /// Compute a turn against a detached copy of the session. No map guard is
    /// held here, so the parallel search never blocks other sessions.
    fn run_turn(
        &self,
        prior: SessionState,
        query: &str,
        top_k: usize,
    ) -> Result<(SessionState, SearchOutcome), JobSearchError> {
        let extracted = self.extractor.extract(query, &prior.queries())?;
        let semantic = if extracted.semantic_query.trim().is_empty() {
            query.to_string()
        } else {
            extracted.semantic_query
        };
        let vector = self.embedder.embed(&semantic)?;

        let mut intent = Intent::new(QueryVectors::Shared(vector))
            .with_weights(
                extracted
                    .weights
                    .map(|w| w.clamped())
                    .unwrap_or(self.engine.config().default_weights),
            )
            .with_filters(extracted.filters)
            .with_semantic_query(semantic);
        for term in extracted.exclusions {
            let term = term.trim();
            if term.is_empty() || prior.has_exclusion(term) {
                continue;
            }
            debug!(term, "embedding new exclusion term");
            let vector = self.embedder.embed(term)?;
            intent = intent.with_exclusion(ExclusionTerm::new(term, vector));
        }

        let mut next = prior;
        let merged = next.apply_turn(query, intent);
        let outcome = self.engine.search_with_meta(&merged, top_k)?;
        next.record_results(outcome.rows());
        Ok((next, outcome))
    }
}
