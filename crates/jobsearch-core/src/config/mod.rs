//! Configuration system for jobsearch.
//! TOML-based, layered resolution: CLI > env > project file > defaults.

pub mod defaults;
pub mod index_config;
pub mod jobsearch_config;
pub mod observability_config;
pub mod ranking_config;
pub mod session_config;

pub use index_config::IndexConfig;
pub use jobsearch_config::{CliOverrides, JobSearchConfig};
pub use observability_config::ObservabilityConfig;
pub use ranking_config::{ExclusionScope, RankingConfig};
pub use session_config::SessionConfig;
