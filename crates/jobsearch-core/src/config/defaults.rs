// Single source of truth for all default values.

// --- Index ---
pub const DEFAULT_INDEX_DIR: &str = "data/index";
pub const DEFAULT_RETAIN_BUILDS: usize = 2;
pub const DEFAULT_VERIFY_CHECKSUMS: bool = false;
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;
pub const DEFAULT_MALFORMED_SAMPLE_LIMIT: usize = 5;

// --- Ranking ---
pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_EXCLUSION_PENALTY: f32 = 0.3;
pub const DEFAULT_SALARY_CONFIRMATION_BOOST: f32 = 0.05;
pub const DEFAULT_SKILL_MATCH_BOOST: f32 = 0.02;
pub const DEFAULT_SKILL_MATCH_CAP: usize = 3;

// --- Default embedding-space weights ---
pub const DEFAULT_WEIGHT_EXPLICIT: f32 = 0.50;
pub const DEFAULT_WEIGHT_INFERRED: f32 = 0.30;
pub const DEFAULT_WEIGHT_COMPANY: f32 = 0.20;

// --- Session ---
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

// --- Observability ---
pub const DEFAULT_LOG_FILTER: &str = "jobsearch=info";
pub const DEFAULT_JSON_LOGS: bool = false;
