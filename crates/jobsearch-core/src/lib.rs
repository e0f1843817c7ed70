//! # jobsearch-core
//!
//! Foundation crate for the jobsearch ranking system.
//! Defines the data model, collaborator traits, errors, config, and tracing setup.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod tracing_setup;
pub mod traits;
pub mod vector;

// Re-export the most commonly used types at the crate root.
pub use config::JobSearchConfig;
pub use errors::{JobSearchError, JobSearchResult};
pub use models::{
    EmbeddingSpace, FilterField, FilterValue, Filters, Intent, JobMetadata, JobRecord,
    QueryVectors, RankedResult, SpaceWeights,
};
pub use tracing_setup::init_tracing;
