//! Data model shared by every jobsearch crate.

pub mod filters;
pub mod intent;
pub mod job;
pub mod ranked;
pub mod space;

pub use filters::{canonical_seniority, FilterField, FilterKind, FilterValue, Filters};
pub use intent::{ExclusionTerm, Intent, IntentDocument, QueryVectors};
pub use job::{DedupKey, GeoPoint, JobEmbeddings, JobMetadata, JobRecord};
pub use ranked::{Boost, RankedResult, SearchMeta, SearchOutcome};
pub use space::{EmbeddingSpace, SpaceWeights};
