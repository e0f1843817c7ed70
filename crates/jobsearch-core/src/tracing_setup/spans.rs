//! Span helpers for the long-running operations.

/// Span around a whole index build.
#[macro_export]
macro_rules! build_span {
    ($build_id:expr) => {
        tracing::info_span!("jobsearch.build", build_id = %$build_id)
    };
}

/// Span around one ranking pass.
#[macro_export]
macro_rules! search_span {
    ($rows:expr, $top_k:expr) => {
        tracing::debug_span!("jobsearch.search", rows = $rows, top_k = $top_k)
    };
}

/// Span around one conversational turn.
#[macro_export]
macro_rules! turn_span {
    ($session_id:expr, $turn:expr) => {
        tracing::info_span!("jobsearch.turn", session_id = %$session_id, turn = $turn)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const BUILD: &str = "jobsearch.build";
    pub const SEARCH: &str = "jobsearch.search";
    pub const TURN: &str = "jobsearch.turn";
}
