/// jobsearch version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// On-disk artifact layout version written to every manifest.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Floor for vector norms during normalization.
pub const NORM_EPSILON: f32 = 1e-12;

/// Allowed deviation of a stored vector's L2 norm from 1.0.
pub const UNIT_NORM_TOLERANCE: f32 = 1e-5;

/// Bytes per matrix element (little-endian f32).
pub const F32_BYTES: usize = 4;

/// Artifact file names.
pub const MANIFEST_FILE: &str = "manifest.json";
pub const METADATA_FILE: &str = "metadata.jsonl";
pub const LOCK_FILE: &str = ".build.lock";
pub const BUILDS_DIR: &str = "builds";
