//! # jobsearch-index
//!
//! Offline build and read-only serving of the job corpus.
//!
//! A build streams records twice (dedup, then write), lays three row-aligned
//! `N x D` little-endian f32 matrices plus a JSONL metadata table into
//! `builds/<build_id>/`, and publishes by atomically swapping the root
//! `manifest.json`. Readers memory-map whatever the root manifest names.

pub mod builder;
pub mod embedding_index;
pub mod manifest;
pub mod matrix;
pub mod metadata_table;

pub use builder::{BuildReport, IndexBuilder};
pub use embedding_index::EmbeddingIndex;
pub use manifest::{ArtifactFile, BuildStats, Manifest};
pub use metadata_table::{DictColumn, MetadataTable};
