//! Row-major little-endian f32 matrices: sequential writer and mmap reader.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use rayon::prelude::*;

use jobsearch_core::constants::F32_BYTES;
use jobsearch_core::errors::IndexError;

use crate::manifest::ArtifactFile;

/// Streams rows into a pre-sized matrix file, hashing as it goes.
pub struct MatrixWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    hasher: blake3::Hasher,
    dims: usize,
    rows_written: usize,
}

impl MatrixWriter {
    /// Create `path` pre-allocated to `rows * dims` elements.
    pub fn create(path: &Path, rows: usize, dims: usize) -> Result<Self, IndexError> {
        let file = File::create(path).map_err(|e| IndexError::io(path, e))?;
        let bytes = matrix_bytes(rows, dims)
            .ok_or_else(|| IndexError::corrupt(format!("matrix {rows}x{dims} overflows")))?;
        file.set_len(bytes).map_err(|e| IndexError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            hasher: blake3::Hasher::new(),
            dims,
            rows_written: 0,
        })
    }

    /// Append the next row. `row.len()` must equal `dims`.
    pub fn push_row(&mut self, row: &[f32]) -> Result<(), IndexError> {
        if row.len() != self.dims {
            return Err(IndexError::InputChanged {
                details: format!(
                    "row {} has {} components, matrix has {}",
                    self.rows_written,
                    row.len(),
                    self.dims
                ),
            });
        }
        let mut buf = Vec::with_capacity(row.len() * F32_BYTES);
        for x in row {
            buf.extend_from_slice(&x.to_le_bytes());
        }
        self.hasher.update(&buf);
        self.writer
            .write_all(&buf)
            .map_err(|e| IndexError::io(&self.path, e))?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush, fsync, and describe the finished file.
    pub fn finish(self) -> Result<ArtifactFile, IndexError> {
        let path = self.path;
        let file = self
            .writer
            .into_inner()
            .map_err(|e| IndexError::io(&path, e.into_error()))?;
        file.sync_all().map_err(|e| IndexError::io(&path, e))?;
        let bytes = (self.rows_written * self.dims * F32_BYTES) as u64;
        Ok(ArtifactFile {
            file: file_name(&path),
            bytes,
            blake3: self.hasher.finalize().to_hex().to_string(),
        })
    }
}

/// A read-only memory-mapped matrix.
#[derive(Debug)]
pub struct Matrix {
    mmap: Mmap,
    rows: usize,
    dims: usize,
}

impl Matrix {
    /// Map `path` and check its size against `rows x dims`.
    pub fn open(path: &Path, rows: usize, dims: usize) -> Result<Self, IndexError> {
        let expected = matrix_bytes(rows, dims)
            .ok_or_else(|| IndexError::corrupt(format!("matrix {rows}x{dims} overflows")))?;
        let file = File::open(path).map_err(|e| IndexError::io(path, e))?;
        let actual = file.metadata().map_err(|e| IndexError::io(path, e))?.len();
        if actual != expected {
            return Err(IndexError::corrupt(format!(
                "{} is {actual} bytes, expected {expected} ({rows} x {dims} x {F32_BYTES})",
                path.display()
            )));
        }
        // SAFETY: published build files are never written again; the builder
        // only creates new build directories.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| IndexError::io(path, e))?;
        Ok(Self { mmap, rows, dims })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn blake3_hex(&self) -> String {
        blake3::hash(&self.mmap).to_hex().to_string()
    }

    /// Decoded copy of one row.
    pub fn row(&self, row: usize) -> Option<Vec<f32>> {
        if row >= self.rows {
            return None;
        }
        let stride = self.dims * F32_BYTES;
        let bytes = &self.mmap[row * stride..(row + 1) * stride];
        Some(decode_row(bytes).collect())
    }

    /// `self * query` for every row. `query` must have length `dims`.
    ///
    /// Rows are split across the rayon pool; each row's dot product is a
    /// sequential loop so the output does not depend on thread count.
    pub fn mat_vec(&self, query: &[f32]) -> Vec<f32> {
        let stride = self.dims * F32_BYTES;
        self.mmap
            .par_chunks_exact(stride)
            .map(|row| decode_row(row).zip(query).map(|(x, q)| x * q).sum::<f32>())
            .collect()
    }
}

#[inline]
fn decode_row(bytes: &[u8]) -> impl Iterator<Item = f32> + '_ {
    bytes
        .chunks_exact(F32_BYTES)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn matrix_bytes(rows: usize, dims: usize) -> Option<u64> {
    rows.checked_mul(dims)?
        .checked_mul(F32_BYTES)
        .map(|b| b as u64)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_map_reads_rows_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("m.f32");
        let mut w = MatrixWriter::create(&path, 2, 3).unwrap();
        w.push_row(&[1.0, 2.0, 3.0]).unwrap();
        w.push_row(&[-1.0, 0.5, 0.0]).unwrap();
        let artifact = w.finish().unwrap();
        assert_eq!(artifact.bytes, 24);
        assert_eq!(artifact.file, "m.f32");

        let m = Matrix::open(&path, 2, 3).unwrap();
        assert_eq!(m.row(1), Some(vec![-1.0, 0.5, 0.0]));
        assert_eq!(m.row(2), None);
        assert_eq!(m.mat_vec(&[1.0, 0.0, 1.0]), vec![4.0, -1.0]);
        assert_eq!(m.blake3_hex(), artifact.blake3);
    }

    #[test]
    fn wrong_size_is_corrupt() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("m.f32");
        std::fs::write(&path, [0u8; 10]).unwrap();
        assert!(matches!(
            Matrix::open(&path, 1, 3),
            Err(IndexError::IndexCorrupt { .. })
        ));
    }

    #[test]
    fn short_row_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut w = MatrixWriter::create(&dir.path().join("m.f32"), 1, 3).unwrap();
        assert!(w.push_row(&[1.0]).is_err());
    }
}
