//! Two-pass index build with atomic publish.
//!
//! Pass 1 validates and deduplicates, keeping only survivor ordinals.
//! Pass 2 re-streams the source and writes survivors row by row, so at most
//! one record's vectors are held in memory at a time.
//!
//! The input must be ordered newest first; the first record of each dedup key
//! is the one kept. This is not re-verified.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use fd_lock::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use jobsearch_core::config::IndexConfig;
use jobsearch_core::constants::{
    BUILDS_DIR, INDEX_FORMAT_VERSION, LOCK_FILE, MANIFEST_FILE, METADATA_FILE,
};
use jobsearch_core::errors::{IndexError, ParseError};
use jobsearch_core::models::{EmbeddingSpace, JobRecord};
use jobsearch_core::vector::normalize_in_place;
use jobsearch_records::RecordSource;

use crate::manifest::{BuildStats, Manifest, MetadataArtifact};
use crate::matrix::MatrixWriter;

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub manifest: Manifest,
    /// Absolute path of the published build directory.
    pub build_dir: PathBuf,
    /// Build directories removed by retention.
    pub pruned: Vec<PathBuf>,
}

impl BuildReport {
    pub fn stats(&self) -> &BuildStats {
        &self.manifest.stats
    }
}

pub struct IndexBuilder {
    config: IndexConfig,
}

/// What pass 1 learned about the stream.
struct Survey {
    survivors: Vec<u64>,
    dims: usize,
    stats: BuildStats,
}

impl IndexBuilder {
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    pub fn index_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.dir)
    }

    /// Build from `source` and publish into the configured index directory.
    pub fn build(&self, source: &dyn RecordSource) -> Result<BuildReport, IndexError> {
        let started = Instant::now();
        let index_dir = self.index_dir();
        fs::create_dir_all(&index_dir).map_err(|e| IndexError::io(&index_dir, e))?;

        let lock_path = index_dir.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| IndexError::io(&lock_path, e))?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock.try_write().map_err(|e| match e.kind() {
            std::io::ErrorKind::WouldBlock => IndexError::BuildLocked {
                path: lock_path.clone(),
            },
            _ => IndexError::io(&lock_path, e),
        })?;

        let build_id = Uuid::new_v4().to_string();
        let span = jobsearch_core::build_span!(build_id);
        let _enter = span.enter();
        info!(source = %source.describe(), dir = %index_dir.display(), "index build started");

        let survey = self.survey(source)?;
        info!(
            records_seen = survey.stats.records_seen,
            malformed = survey.stats.malformed,
            duplicates = survey.stats.duplicates,
            rows = survey.survivors.len(),
            dims = survey.dims,
            "pass 1 complete"
        );

        let relative_dir = format!("{BUILDS_DIR}/{build_id}");
        let build_dir = index_dir.join(&relative_dir);
        fs::create_dir_all(&build_dir).map_err(|e| IndexError::io(&build_dir, e))?;

        let manifest = match self.write_build(source, &survey, &build_id, &relative_dir, &build_dir, started) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "build failed, removing partial build directory");
                let _ = fs::remove_dir_all(&build_dir);
                return Err(e);
            }
        };

        manifest.write_atomic(&index_dir.join(MANIFEST_FILE))?;
        info!(
            rows = manifest.rows,
            dims = manifest.dims,
            elapsed_ms = manifest.stats.elapsed_ms,
            "index published"
        );

        let pruned = self.prune(&index_dir, &build_id)?;

        Ok(BuildReport {
            manifest,
            build_dir,
            pruned,
        })
    }

    /// Pass 1: validate, fix D, and pick survivors.
    fn survey(&self, source: &dyn RecordSource) -> Result<Survey, IndexError> {
        let limit = self.config.max_records.unwrap_or(u64::MAX);
        let mut stats = BuildStats::default();
        let mut seen = HashSet::new();
        let mut survivors = Vec::new();
        let mut dims: Option<usize> = None;

        for (item, ordinal) in source.open()?.zip(0u64..).take_while(|(_, o)| *o < limit) {
            stats.records_seen += 1;
            self.log_progress("pass 1", stats.records_seen);

            let record = match item?.and_then(|r| check_dims(r, dims, ordinal)) {
                Ok(r) => r,
                Err(e) => {
                    self.record_malformed(&mut stats, &e);
                    continue;
                }
            };
            dims.get_or_insert(record.embeddings.dims());

            if !seen.insert(record.dedup_key()) {
                stats.duplicates += 1;
                debug!(ordinal, id = %record.metadata.id, "duplicate posting skipped");
                continue;
            }
            survivors.push(ordinal);
        }

        let dims = match dims {
            Some(d) if !survivors.is_empty() => d,
            _ => {
                return Err(IndexError::EmptyCorpus {
                    malformed: stats.malformed,
                })
            }
        };
        stats.rows = survivors.len();
        stats.dims = dims;

        Ok(Survey {
            survivors,
            dims,
            stats,
        })
    }

    /// Pass 2: write matrices and metadata for every survivor.
    fn write_build(
        &self,
        source: &dyn RecordSource,
        survey: &Survey,
        build_id: &str,
        relative_dir: &str,
        build_dir: &Path,
        started: Instant,
    ) -> Result<Manifest, IndexError> {
        let rows = survey.survivors.len();
        let dims = survey.dims;
        let limit = self.config.max_records.unwrap_or(u64::MAX);

        let mut writers = Vec::with_capacity(EmbeddingSpace::ALL.len());
        for space in EmbeddingSpace::ALL {
            writers.push((
                space,
                MatrixWriter::create(&build_dir.join(space.matrix_file()), rows, dims)?,
            ));
        }
        let mut metadata = MetadataWriter::create(&build_dir.join(METADATA_FILE))?;

        let mut next = 0usize;
        let mut seen_this_pass = 0u64;
        for (item, ordinal) in source.open()?.zip(0u64..).take_while(|(_, o)| *o < limit) {
            seen_this_pass += 1;
            let item = item?;
            self.log_progress("pass 2", seen_this_pass);

            if survey.survivors.get(next) != Some(&ordinal) {
                continue;
            }
            let mut record = item
                .and_then(|r| check_dims(r, Some(dims), ordinal))
                .map_err(|e| IndexError::InputChanged {
                    details: format!("survivor at ordinal {ordinal} no longer valid: {e}"),
                })?;

            for (space, writer) in writers.iter_mut() {
                let v = record.embeddings.get_mut(*space);
                normalize_in_place(v);
                writer.push_row(v)?;
            }
            metadata.push(&record.metadata)?;
            next += 1;
        }

        if next != rows || seen_this_pass != survey.stats.records_seen {
            return Err(IndexError::InputChanged {
                details: format!(
                    "pass 1 saw {} records / {rows} rows, pass 2 saw {seen_this_pass} records / {next} rows",
                    survey.stats.records_seen
                ),
            });
        }

        let mut files = std::collections::BTreeMap::new();
        for (space, writer) in writers {
            files.insert(space, writer.finish()?);
        }
        let metadata = metadata.finish()?;

        let mut stats = survey.stats.clone();
        stats.elapsed_ms = started.elapsed().as_millis() as u64;

        let manifest = Manifest {
            format_version: INDEX_FORMAT_VERSION,
            build_id: build_id.to_string(),
            created_at: Utc::now(),
            rows,
            dims,
            build_dir: relative_dir.to_string(),
            files,
            metadata,
            stats,
        };
        manifest.write(&build_dir.join(MANIFEST_FILE))?;
        Ok(manifest)
    }

    /// Remove the oldest build directories beyond `retain_builds`, never the
    /// one just published.
    fn prune(&self, index_dir: &Path, current: &str) -> Result<Vec<PathBuf>, IndexError> {
        let builds_dir = index_dir.join(BUILDS_DIR);
        let entries = fs::read_dir(&builds_dir).map_err(|e| IndexError::io(&builds_dir, e))?;

        let mut others = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| IndexError::io(&builds_dir, e))?;
            let path = entry.path();
            if !path.is_dir() || entry.file_name().to_string_lossy() == current {
                continue;
            }
            // Directories without a readable manifest are leftovers and go first.
            let created_at = Manifest::read(&path.join(MANIFEST_FILE))
                .map(|m| m.created_at)
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
            others.push((created_at, path));
        }

        // Newest first; keep retain_builds - 1 of them next to the current one.
        others.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        let keep = self.config.retain_builds.saturating_sub(1);

        let mut pruned = Vec::new();
        for (_, path) in others.into_iter().skip(keep) {
            match fs::remove_dir_all(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "pruned old build");
                    pruned.push(path);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "could not prune old build"),
            }
        }
        Ok(pruned)
    }

    fn record_malformed(&self, stats: &mut BuildStats, err: &ParseError) {
        stats.malformed += 1;
        debug!(ordinal = err.ordinal(), error = %err, "malformed record skipped");
        if stats.malformed_samples.len() < self.config.malformed_sample_limit {
            stats.malformed_samples.push(err.to_string());
        }
    }

    fn log_progress(&self, pass: &'static str, seen: u64) {
        if self.config.progress_interval > 0 && seen % self.config.progress_interval == 0 {
            info!(pass, records = seen, "build progress");
        }
    }
}

/// Corpus-wide dimension check; D is fixed by the first valid record.
/// All three spaces must agree with it.
fn check_dims(record: JobRecord, dims: Option<usize>, ordinal: u64) -> Result<JobRecord, ParseError> {
    let expected = dims.unwrap_or_else(|| record.embeddings.dims());
    for space in EmbeddingSpace::ALL {
        let actual = record.embeddings.get(space).len();
        if actual != expected {
            return Err(ParseError::DimensionMismatch {
                ordinal,
                expected,
                actual,
            });
        }
    }
    Ok(record)
}

/// JSONL metadata writer that hashes what it writes.
struct MetadataWriter {
    path: PathBuf,
    writer: BufWriter<fs::File>,
    hasher: blake3::Hasher,
    rows: usize,
}

impl MetadataWriter {
    fn create(path: &Path) -> Result<Self, IndexError> {
        let file = fs::File::create(path).map_err(|e| IndexError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            hasher: blake3::Hasher::new(),
            rows: 0,
        })
    }

    fn push(&mut self, meta: &jobsearch_core::models::JobMetadata) -> Result<(), IndexError> {
        let mut line = serde_json::to_vec(meta).map_err(|e| IndexError::Serialization {
            message: e.to_string(),
        })?;
        line.push(b'\n');
        self.hasher.update(&line);
        self.writer
            .write_all(&line)
            .map_err(|e| IndexError::io(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    fn finish(self) -> Result<MetadataArtifact, IndexError> {
        let path = self.path;
        let file = self
            .writer
            .into_inner()
            .map_err(|e| IndexError::io(&path, e.into_error()))?;
        file.sync_all().map_err(|e| IndexError::io(&path, e))?;
        Ok(MetadataArtifact {
            file: METADATA_FILE.to_string(),
            rows: self.rows,
            blake3: self.hasher.finalize().to_hex().to_string(),
        })
    }
}
