//! Tests for the layered configuration system.

use std::collections::HashMap;
use std::sync::Mutex;

use jobsearch_core::config::{CliOverrides, ExclusionScope, JobSearchConfig};
use jobsearch_core::errors::ConfigError;

/// Serializes tests that touch process environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ENV_KEYS: &[&str] = &[
    "JOBSEARCH_INDEX_DIR",
    "JOBSEARCH_VERIFY_CHECKSUMS",
    "JOBSEARCH_MAX_RECORDS",
    "JOBSEARCH_TOP_K",
    "JOBSEARCH_EXCLUSION_PENALTY",
    "JOBSEARCH_EXCLUSION_SCOPE",
    "JOBSEARCH_SESSION_TTL_SECS",
    "JOBSEARCH_JSON_LOGS",
];

fn clear_env_vars() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults_without_project_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempfile::TempDir::new().unwrap();
    let config = JobSearchConfig::load(dir.path(), None).unwrap();

    assert_eq!(config.index.dir, "data/index");
    assert_eq!(config.index.retain_builds, 2);
    assert_eq!(config.ranking.default_top_k, 10);
    assert!((config.ranking.exclusion_penalty - 0.3).abs() < f32::EPSILON);
    assert!((config.ranking.salary_confirmation_boost - 0.05).abs() < f32::EPSILON);
    assert_eq!(config.ranking.exclusion_scope, ExclusionScope::Inferred);
    assert_eq!(config.session.ttl_secs, 1800);
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("jobsearch.toml"),
        r#"
[index]
dir = "from-file"
retain_builds = 4

[ranking]
default_top_k = 25
exclusion_scope = "all_spaces"
"#,
    )
    .unwrap();

    std::env::set_var("JOBSEARCH_TOP_K", "30");
    std::env::set_var("JOBSEARCH_INDEX_DIR", "from-env");

    let cli = CliOverrides {
        index_dir: Some("from-cli".into()),
        ..Default::default()
    };
    let config = JobSearchConfig::load(dir.path(), Some(&cli)).unwrap();

    // CLI beats env beats file.
    assert_eq!(config.index.dir, "from-cli");
    assert_eq!(config.ranking.default_top_k, 30);
    assert_eq!(config.index.retain_builds, 4);
    assert_eq!(config.ranking.exclusion_scope, ExclusionScope::AllSpaces);

    clear_env_vars();
}

#[test]
fn test_env_overrides_through_lookup() {
    let mut config = JobSearchConfig::default();
    config
        .apply_env_overrides(lookup(&[
            ("JOBSEARCH_EXCLUSION_PENALTY", "0.5"),
            ("JOBSEARCH_EXCLUSION_SCOPE", "all_spaces"),
            ("JOBSEARCH_VERIFY_CHECKSUMS", "true"),
            ("JOBSEARCH_MAX_RECORDS", "5000"),
        ]))
        .unwrap();

    assert!((config.ranking.exclusion_penalty - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.ranking.exclusion_scope, ExclusionScope::AllSpaces);
    assert!(config.index.verify_checksums);
    assert_eq!(config.index.max_records, Some(5000));
}

#[test]
fn test_bad_env_value_is_rejected() {
    let mut config = JobSearchConfig::default();
    let err = config
        .apply_env_overrides(lookup(&[("JOBSEARCH_TOP_K", "lots")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "JOBSEARCH_TOP_K"));

    let err = config
        .apply_env_overrides(lookup(&[("JOBSEARCH_EXCLUSION_SCOPE", "explicit")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut config = JobSearchConfig::default();
    config.ranking.default_top_k = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationFailed { .. })
    ));

    let mut config = JobSearchConfig::default();
    config.ranking.exclusion_penalty = f32::NAN;
    assert!(config.validate().is_err());

    let mut config = JobSearchConfig::default();
    config.ranking.default_weights.company = -0.1;
    assert!(config.validate().is_err());

    let mut config = JobSearchConfig::default();
    config.index.retain_builds = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let err = JobSearchConfig::from_toml("[ranking\ndefault_top_k = ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_toml_round_trip_preserves_values() {
    let mut config = JobSearchConfig::default();
    config.ranking.default_top_k = 7;
    config.session.ttl_secs = 60;

    let text = config.to_toml().unwrap();
    let back = JobSearchConfig::from_toml(&text).unwrap();
    assert_eq!(back.ranking.default_top_k, 7);
    assert_eq!(back.session.ttl_secs, 60);
}

#[test]
fn test_unknown_keys_are_ignored() {
    let config = JobSearchConfig::from_toml(
        r#"
[ranking]
default_top_k = 3
some_future_knob = true
"#,
    )
    .unwrap();
    assert_eq!(config.ranking.default_top_k, 3);
}
