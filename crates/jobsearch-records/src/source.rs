//! Re-streamable record sources.
//!
//! A source can be opened any number of times; each `open` yields the same
//! records in the same order as long as the underlying input is unchanged.
//! Item ordinals are positions in that stream (blank lines excluded).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use jobsearch_core::errors::{IndexError, ParseError};
use jobsearch_core::models::JobRecord;

use crate::posting::parse_posting;

/// One record, or the reason it could not be parsed.
pub type RecordResult = Result<JobRecord, ParseError>;

/// A pass over a source. The outer `Err` is an unreadable input and is fatal.
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<RecordResult, IndexError>> + Send + 'a>;

pub trait RecordSource: Send + Sync {
    /// Start a fresh pass from the first record.
    fn open(&self) -> Result<RecordStream<'_>, IndexError>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

/// JSONL file of raw postings, newest first.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    path: PathBuf,
    max_records: Option<u64>,
}

impl JsonlSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_records: None,
        }
    }

    /// Stop after `limit` records.
    pub fn with_max_records(mut self, limit: Option<u64>) -> Self {
        self.max_records = limit;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonlSource {
    fn open(&self) -> Result<RecordStream<'_>, IndexError> {
        let file = File::open(&self.path).map_err(|e| IndexError::io(&self.path, e))?;
        let path = self.path.clone();
        let limit = self.max_records.unwrap_or(u64::MAX);

        // Raw byte lines: invalid UTF-8 is a malformed row, not a read failure.
        let lines = BufReader::new(file)
            .split(b'\n')
            .filter(|line| !matches!(line, Ok(bytes) if bytes.trim_ascii().is_empty()));

        let stream = lines
            .zip(0u64..)
            .take_while(move |(_, ordinal)| *ordinal < limit)
            .map(move |(line, ordinal)| -> Result<RecordResult, IndexError> {
                let line = line.map_err(|e| IndexError::io(&path, e))?;
                Ok(serde_json::from_slice::<serde_json::Value>(&line)
                    .map_err(|e| ParseError::InvalidJson {
                        ordinal,
                        message: e.to_string(),
                    })
                    .and_then(|raw| parse_posting(&raw, ordinal)))
            });

        Ok(Box::new(stream))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory source, mostly for tests and small corpora.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    items: Vec<RecordResult>,
}

impl MemorySource {
    pub fn new(records: Vec<JobRecord>) -> Self {
        Self {
            items: records.into_iter().map(Ok).collect(),
        }
    }

    /// Include pre-failed items to exercise malformed-row handling.
    pub fn from_results(items: Vec<RecordResult>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl RecordSource for MemorySource {
    fn open(&self) -> Result<RecordStream<'_>, IndexError> {
        Ok(Box::new(
            self.items
                .iter()
                .cloned()
                .map(Ok::<RecordResult, IndexError>),
        ))
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.items.len())
    }
}
