use serde::{Deserialize, Serialize};

use super::defaults;

/// Index build and open configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding the root manifest and the `builds/` tree.
    pub dir: String,
    /// Number of published builds kept on disk (the current one included).
    pub retain_builds: usize,
    /// Verify blake3 checksums of every artifact on open.
    pub verify_checksums: bool,
    /// Log build progress every N input records.
    pub progress_interval: u64,
    /// Stop reading input after this many records.
    pub max_records: Option<u64>,
    /// How many malformed-row messages the build report keeps.
    pub malformed_sample_limit: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: defaults::DEFAULT_INDEX_DIR.to_string(),
            retain_builds: defaults::DEFAULT_RETAIN_BUILDS,
            verify_checksums: defaults::DEFAULT_VERIFY_CHECKSUMS,
            progress_interval: defaults::DEFAULT_PROGRESS_INTERVAL,
            max_records: None,
            malformed_sample_limit: defaults::DEFAULT_MALFORMED_SAMPLE_LIMIT,
        }
    }
}
