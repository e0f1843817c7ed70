//! Build manifest: the single pointer readers follow to a published build.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobsearch_core::errors::IndexError;
use jobsearch_core::models::EmbeddingSpace;

/// One written artifact with its size and content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub file: String,
    pub bytes: u64,
    pub blake3: String,
}

/// The metadata table artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataArtifact {
    pub file: String,
    pub rows: usize,
    pub blake3: String,
}

/// Counters reported by a build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildStats {
    pub records_seen: u64,
    pub malformed: u64,
    pub duplicates: u64,
    pub rows: usize,
    pub dims: usize,
    pub elapsed_ms: u64,
    /// First few malformed-row messages.
    #[serde(default)]
    pub malformed_samples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub build_id: String,
    pub created_at: DateTime<Utc>,
    pub rows: usize,
    pub dims: usize,
    /// Build directory relative to the index root, e.g. `builds/<id>`.
    pub build_dir: String,
    pub files: BTreeMap<EmbeddingSpace, ArtifactFile>,
    pub metadata: MetadataArtifact,
    pub stats: BuildStats,
}

impl Manifest {
    pub fn read(path: &Path) -> Result<Self, IndexError> {
        let content = std::fs::read_to_string(path).map_err(|e| IndexError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| {
            IndexError::corrupt(format!("unreadable manifest {}: {e}", path.display()))
        })
    }

    /// Plain write, used for the staging copy inside a build directory.
    pub fn write(&self, path: &Path) -> Result<(), IndexError> {
        std::fs::write(path, self.to_json()?).map_err(|e| IndexError::io(path, e))
    }

    /// Write to a temp file next to `path` and rename over it, so readers see
    /// either the old manifest or the new one.
    pub fn write_atomic(&self, path: &Path) -> Result<(), IndexError> {
        let temp_path = path.with_extension("json.tmp");
        {
            let mut file = File::create(&temp_path).map_err(|e| IndexError::io(&temp_path, e))?;
            file.write_all(self.to_json()?.as_bytes())
                .and_then(|()| file.sync_all())
                .map_err(|e| IndexError::io(&temp_path, e))?;
        }
        match std::fs::rename(&temp_path, path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                std::fs::remove_file(path).map_err(|e| IndexError::io(path, e))?;
                std::fs::rename(&temp_path, path).map_err(|e| {
                    let _ = std::fs::remove_file(&temp_path);
                    IndexError::io(path, e)
                })
            }
            Err(err) => {
                let _ = std::fs::remove_file(&temp_path);
                Err(IndexError::io(path, err))
            }
        }
    }

    pub fn matrix(&self, space: EmbeddingSpace) -> Option<&ArtifactFile> {
        self.files.get(&space)
    }

    fn to_json(&self) -> Result<String, IndexError> {
        serde_json::to_string_pretty(self).map_err(|e| IndexError::Serialization {
            message: e.to_string(),
        })
    }
}
