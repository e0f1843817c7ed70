//! # jobsearch-ranking
//!
//! Scores every row of an `EmbeddingIndex` against an `Intent`:
//! weighted multi-space cosine, exclusion penalty, null-safe structured
//! filters, confirmation boosts, then a partial top-k selection.

pub mod boosts;
pub mod engine;
pub mod filters;
pub mod scoring;
pub mod selection;
pub mod validation;

pub use engine::RankingEngine;
