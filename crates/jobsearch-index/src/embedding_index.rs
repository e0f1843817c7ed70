//! Read-only view of a published build.

use std::path::{Path, PathBuf};

use tracing::info;

use jobsearch_core::config::IndexConfig;
use jobsearch_core::constants::{INDEX_FORMAT_VERSION, MANIFEST_FILE};
use jobsearch_core::errors::{IndexError, ValidationError};
use jobsearch_core::models::{EmbeddingSpace, JobMetadata};
use jobsearch_core::vector::{first_non_finite, normalized};

use crate::manifest::Manifest;
use crate::matrix::Matrix;
use crate::metadata_table::MetadataTable;

/// Three memory-mapped `rows x dims` matrices plus the columnar metadata
/// table, all row-aligned. Immutable once opened; share it behind an `Arc`.
#[derive(Debug)]
pub struct EmbeddingIndex {
    build_dir: PathBuf,
    manifest: Manifest,
    explicit: Matrix,
    inferred: Matrix,
    company: Matrix,
    table: MetadataTable,
}

impl EmbeddingIndex {
    /// Open whatever build the root manifest in `dir` points at.
    pub fn open(dir: impl AsRef<Path>, config: &IndexConfig) -> Result<Self, IndexError> {
        let dir = dir.as_ref();
        let manifest = Manifest::read(&dir.join(MANIFEST_FILE))?;

        if manifest.format_version != INDEX_FORMAT_VERSION {
            return Err(IndexError::corrupt(format!(
                "unsupported format version {} (expected {INDEX_FORMAT_VERSION})",
                manifest.format_version
            )));
        }
        if manifest.rows == 0 || manifest.dims == 0 {
            return Err(IndexError::corrupt(format!(
                "manifest declares an empty {}x{} corpus",
                manifest.rows, manifest.dims
            )));
        }

        let build_dir = dir.join(&manifest.build_dir);
        let open_space = |space: EmbeddingSpace| -> Result<Matrix, IndexError> {
            let artifact = manifest
                .matrix(space)
                .ok_or_else(|| IndexError::corrupt(format!("manifest lists no {space} matrix")))?;
            let matrix = Matrix::open(&build_dir.join(&artifact.file), manifest.rows, manifest.dims)?;
            if config.verify_checksums && matrix.blake3_hex() != artifact.blake3 {
                return Err(IndexError::corrupt(format!("{space} matrix checksum mismatch")));
            }
            Ok(matrix)
        };
        let explicit = open_space(EmbeddingSpace::Explicit)?;
        let inferred = open_space(EmbeddingSpace::Inferred)?;
        let company = open_space(EmbeddingSpace::Company)?;

        let metadata_path = build_dir.join(&manifest.metadata.file);
        if config.verify_checksums {
            let bytes = std::fs::read(&metadata_path).map_err(|e| IndexError::io(&metadata_path, e))?;
            if blake3::hash(&bytes).to_hex().as_str() != manifest.metadata.blake3 {
                return Err(IndexError::corrupt("metadata checksum mismatch"));
            }
        }
        let table = MetadataTable::from_jsonl(&metadata_path)?;
        if table.len() != manifest.rows || manifest.metadata.rows != manifest.rows {
            return Err(IndexError::corrupt(format!(
                "metadata has {} rows, manifest declares {}",
                table.len(),
                manifest.rows
            )));
        }

        info!(
            build_id = %manifest.build_id,
            rows = manifest.rows,
            dims = manifest.dims,
            verified = config.verify_checksums,
            "index opened"
        );

        Ok(Self {
            build_dir,
            manifest,
            explicit,
            inferred,
            company,
            table,
        })
    }

    pub fn rows(&self) -> usize {
        self.manifest.rows
    }

    pub fn dims(&self) -> usize {
        self.manifest.dims
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn table(&self) -> &MetadataTable {
        &self.table
    }

    pub fn metadata(&self, row: usize) -> Option<JobMetadata> {
        self.table.row(row)
    }

    fn matrix(&self, space: EmbeddingSpace) -> &Matrix {
        match space {
            EmbeddingSpace::Explicit => &self.explicit,
            EmbeddingSpace::Inferred => &self.inferred,
            EmbeddingSpace::Company => &self.company,
        }
    }

    /// Stored (unit-length) vector of `row` in `space`.
    pub fn row_vector(&self, space: EmbeddingSpace, row: usize) -> Option<Vec<f32>> {
        self.matrix(space).row(row)
    }

    /// Cosine similarity of `query` against every row of `space`.
    ///
    /// The query is re-normalized first; stored rows already are.
    pub fn similarity(&self, space: EmbeddingSpace, query: &[f32]) -> Result<Vec<f32>, ValidationError> {
        let label = format!("query.{space}");
        if query.len() != self.dims() {
            return Err(ValidationError::DimensionMismatch {
                vector: label,
                expected: self.dims(),
                actual: query.len(),
            });
        }
        if let Some(position) = first_non_finite(query) {
            return Err(ValidationError::NonFiniteVector {
                vector: label,
                position,
            });
        }
        Ok(self.matrix(space).mat_vec(&normalized(query)))
    }
}
