//! Stable string codes for surfacing errors across process boundaries.

/// Every error enum implements this to expose a machine-readable code.
pub trait ErrorCode {
    /// Returns the code string (e.g., "INDEX_CORRUPT").
    fn error_code(&self) -> &'static str;

    /// Returns `[CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const INDEX_CORRUPT: &str = "INDEX_CORRUPT";
pub const INDEX_IO: &str = "INDEX_IO";
pub const BUILD_LOCKED: &str = "BUILD_LOCKED";
pub const INPUT_CHANGED: &str = "INPUT_CHANGED";
pub const EMPTY_CORPUS: &str = "EMPTY_CORPUS";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const UNKNOWN_FILTER_FIELD: &str = "UNKNOWN_FILTER_FIELD";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const COLLABORATOR_ERROR: &str = "COLLABORATOR_ERROR";
