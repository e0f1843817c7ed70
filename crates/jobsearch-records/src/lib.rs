//! # jobsearch-records
//!
//! Turns raw upstream postings into canonical `JobRecord`s and streams them
//! from JSONL files. Parsing is per-record: a bad posting becomes a
//! `ParseError` item and never aborts the stream.

pub mod html;
pub mod normalize;
pub mod posting;
pub mod source;

pub use html::strip_html;
pub use posting::parse_posting;
pub use source::{JsonlSource, MemorySource, RecordResult, RecordSource, RecordStream};
