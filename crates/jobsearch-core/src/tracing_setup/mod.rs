//! Tracing initialization.
//! `tracing` with `EnvFilter`, per-crate log levels, optional JSON lines.

pub mod spans;

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

/// Environment variable holding the filter directive.
pub const LOG_ENV_VAR: &str = "JOBSEARCH_LOG";

static INIT: Once = Once::new();

/// Initialize the jobsearch tracing/logging system.
///
/// Reads `JOBSEARCH_LOG` for per-crate log levels, e.g.
/// `JOBSEARCH_LOG=jobsearch_index=debug,jobsearch_ranking=info`.
/// Falls back to `config.log_filter` when unset or invalid.
///
/// Logs go to stderr. Idempotent: only the first call installs a subscriber.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

        if config.json_logs {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .init();
        }
    });
}
