use serde::{Deserialize, Serialize};

use super::defaults;

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle time after which a session is discarded by cleanup.
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: defaults::DEFAULT_SESSION_TTL_SECS,
        }
    }
}
