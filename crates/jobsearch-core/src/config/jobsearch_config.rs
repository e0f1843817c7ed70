//! Top-level jobsearch configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ExclusionScope, IndexConfig, ObservabilityConfig, RankingConfig, SessionConfig};
use crate::errors::ConfigError;

/// Project config file name looked up in the working root.
pub const CONFIG_FILE_NAME: &str = "jobsearch.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `CliOverrides`)
/// 2. Environment variables (`JOBSEARCH_*`)
/// 3. Project config (`jobsearch.toml` in the root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobSearchConfig {
    pub index: IndexConfig,
    pub ranking: RankingConfig,
    pub session: SessionConfig,
    pub observability: ObservabilityConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub index_dir: Option<String>,
    pub max_records: Option<u64>,
    pub top_k: Option<usize>,
    pub verify_checksums: Option<bool>,
    pub json_logs: Option<bool>,
}

impl JobSearchConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let project_config_path = root.join(CONFIG_FILE_NAME);
        let mut config = if project_config_path.exists() {
            Self::from_file(&project_config_path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;

        if let Some(cli) = cli_overrides {
            config.apply_cli_overrides(cli);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file. Unknown keys are ignored (forward-compatible).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `JOBSEARCH_*` overrides read through `lookup`.
    ///
    /// Unparseable values are rejected rather than silently ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("JOBSEARCH_INDEX_DIR") {
            self.index.dir = val;
        }
        if let Some(val) = lookup("JOBSEARCH_VERIFY_CHECKSUMS") {
            self.index.verify_checksums = parse_env("JOBSEARCH_VERIFY_CHECKSUMS", &val)?;
        }
        if let Some(val) = lookup("JOBSEARCH_MAX_RECORDS") {
            self.index.max_records = Some(parse_env("JOBSEARCH_MAX_RECORDS", &val)?);
        }
        if let Some(val) = lookup("JOBSEARCH_TOP_K") {
            self.ranking.default_top_k = parse_env("JOBSEARCH_TOP_K", &val)?;
        }
        if let Some(val) = lookup("JOBSEARCH_EXCLUSION_PENALTY") {
            self.ranking.exclusion_penalty = parse_env("JOBSEARCH_EXCLUSION_PENALTY", &val)?;
        }
        if let Some(val) = lookup("JOBSEARCH_EXCLUSION_SCOPE") {
            self.ranking.exclusion_scope = match val.trim().to_ascii_lowercase().as_str() {
                "inferred" => ExclusionScope::Inferred,
                "all_spaces" | "all" => ExclusionScope::AllSpaces,
                other => {
                    return Err(ConfigError::InvalidValue {
                        field: "JOBSEARCH_EXCLUSION_SCOPE".to_string(),
                        message: format!("expected `inferred` or `all_spaces`, got `{other}`"),
                    })
                }
            };
        }
        if let Some(val) = lookup("JOBSEARCH_SESSION_TTL_SECS") {
            self.session.ttl_secs = parse_env("JOBSEARCH_SESSION_TTL_SECS", &val)?;
        }
        if let Some(val) = lookup("JOBSEARCH_JSON_LOGS") {
            self.observability.json_logs = parse_env("JOBSEARCH_JSON_LOGS", &val)?;
        }
        Ok(())
    }

    /// Apply CLI overrides (highest priority).
    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(ref v) = cli.index_dir {
            self.index.dir = v.clone();
        }
        if let Some(v) = cli.max_records {
            self.index.max_records = Some(v);
        }
        if let Some(v) = cli.top_k {
            self.ranking.default_top_k = v;
        }
        if let Some(v) = cli.verify_checksums {
            self.index.verify_checksums = v;
        }
        if let Some(v) = cli.json_logs {
            self.observability.json_logs = v;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ranking.default_top_k == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "ranking.default_top_k".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        for (field, value) in [
            ("ranking.exclusion_penalty", self.ranking.exclusion_penalty),
            (
                "ranking.salary_confirmation_boost",
                self.ranking.salary_confirmation_boost,
            ),
            ("ranking.skill_match_boost", self.ranking.skill_match_boost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be a finite, non-negative number".to_string(),
                });
            }
        }
        let w = &self.ranking.default_weights;
        if ![w.explicit, w.inferred, w.company]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
        {
            return Err(ConfigError::ValidationFailed {
                field: "ranking.default_weights".to_string(),
                message: "weights must be finite and non-negative".to_string(),
            });
        }
        if self.index.retain_builds == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "index.retain_builds".to_string(),
                message: "must keep at least the current build".to_string(),
            });
        }
        if self.index.dir.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "index.dir".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        field: key.to_string(),
        message: format!("cannot parse `{raw}`"),
    })
}
