//! End-to-end build / publish / open tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use jobsearch_core::config::IndexConfig;
use jobsearch_core::errors::{IndexError, ParseError, ValidationError};
use jobsearch_core::models::EmbeddingSpace;
use jobsearch_core::vector::l2_norm;
use jobsearch_core::JobRecord;
use jobsearch_index::{EmbeddingIndex, IndexBuilder, Manifest};
use jobsearch_records::{JsonlSource, MemorySource, RecordResult, RecordSource, RecordStream};
use proptest::prelude::*;
use test_fixtures::{fixture_path, record, synthetic_records, unit, PostingBuilder};

fn config(dir: &std::path::Path) -> IndexConfig {
    IndexConfig {
        dir: dir.display().to_string(),
        ..Default::default()
    }
}

fn sample_source() -> JsonlSource {
    JsonlSource::new(fixture_path("postings/sample.jsonl"))
}

#[test]
fn sample_build_dedups_and_counts() {
    let dir = tempfile::TempDir::new().unwrap();
    let report = IndexBuilder::new(config(dir.path()))
        .build(&sample_source())
        .unwrap();

    let stats = report.stats();
    assert_eq!(stats.records_seen, 6);
    assert_eq!(stats.malformed, 2);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.rows, 3);
    assert_eq!(stats.dims, 4);
    assert_eq!(stats.malformed_samples.len(), 2);

    let index = EmbeddingIndex::open(dir.path(), &config(dir.path())).unwrap();
    assert_eq!(index.rows(), 3);
    assert_eq!(index.dims(), 4);
    let ids: Vec<_> = (0..3).map(|r| index.table().id(r).unwrap().to_string()).collect();
    // The newest-first duplicate (sample-1) survives, not sample-3.
    assert_eq!(ids, vec!["sample-1", "sample-2", "sample-5"]);
}

#[test]
fn stored_vectors_are_unit_length() {
    let dir = tempfile::TempDir::new().unwrap();
    IndexBuilder::new(config(dir.path()))
        .build(&sample_source())
        .unwrap();
    let index = EmbeddingIndex::open(dir.path(), &config(dir.path())).unwrap();

    for space in EmbeddingSpace::ALL {
        for row in 0..index.rows() {
            let v = index.row_vector(space, row).unwrap();
            assert!((l2_norm(&v) - 1.0).abs() <= 1e-5, "{space} row {row}");
        }
    }
    let designer = index.row_vector(EmbeddingSpace::Explicit, 2).unwrap();
    assert!((designer[2] - 0.6).abs() < 1e-6);
    assert!((designer[3] - 0.8).abs() < 1e-6);
}

#[test]
fn rebuild_is_idempotent_and_prunes_old_builds() {
    let dir = tempfile::TempDir::new().unwrap();
    let builder = IndexBuilder::new(config(dir.path()));

    let first = builder.build(&sample_source()).unwrap();
    let second = builder.build(&sample_source()).unwrap();
    let third = builder.build(&sample_source()).unwrap();

    assert_ne!(first.manifest.build_id, second.manifest.build_id);
    assert_eq!(first.manifest.files, third.manifest.files);
    assert_eq!(first.manifest.metadata, third.manifest.metadata);
    assert_eq!(first.manifest.rows, third.manifest.rows);

    // retain_builds = 2: the current build plus one predecessor.
    let remaining = std::fs::read_dir(dir.path().join("builds")).unwrap().count();
    assert_eq!(remaining, 2);
    assert!(third.build_dir.exists());
    assert!(!first.build_dir.exists());

    let index = EmbeddingIndex::open(dir.path(), &config(dir.path())).unwrap();
    assert_eq!(index.manifest().build_id, third.manifest.build_id);
}

#[test]
fn published_manifest_replaces_the_previous_one_without_leftovers() {
    let dir = tempfile::TempDir::new().unwrap();
    let builder = IndexBuilder::new(config(dir.path()));
    builder.build(&sample_source()).unwrap();
    let second = builder.build(&sample_source()).unwrap();

    let root = dir.path().join("manifest.json");
    assert_eq!(Manifest::read(&root).unwrap(), second.manifest);
    assert!(!dir.path().join("manifest.json.tmp").exists());
}

#[test]
fn truncated_matrix_is_corrupt() {
    let dir = tempfile::TempDir::new().unwrap();
    let report = IndexBuilder::new(config(dir.path()))
        .build(&sample_source())
        .unwrap();

    let path = report.build_dir.join("inferred.f32");
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();

    let err = EmbeddingIndex::open(dir.path(), &config(dir.path())).unwrap_err();
    assert!(matches!(err, IndexError::IndexCorrupt { .. }), "{err}");
}

#[test]
fn checksum_mismatch_detected_only_when_verifying() {
    let dir = tempfile::TempDir::new().unwrap();
    let report = IndexBuilder::new(config(dir.path()))
        .build(&sample_source())
        .unwrap();

    let path = report.build_dir.join("company.f32");
    let mut bytes = std::fs::read(&path).unwrap();
    bytes[0] ^= 0xFF;
    std::fs::write(&path, &bytes).unwrap();

    assert!(EmbeddingIndex::open(dir.path(), &config(dir.path())).is_ok());

    let verifying = IndexConfig {
        verify_checksums: true,
        ..config(dir.path())
    };
    assert!(matches!(
        EmbeddingIndex::open(dir.path(), &verifying),
        Err(IndexError::IndexCorrupt { .. })
    ));
}

#[test]
fn metadata_row_count_mismatch_is_corrupt() {
    let dir = tempfile::TempDir::new().unwrap();
    let report = IndexBuilder::new(config(dir.path()))
        .build(&sample_source())
        .unwrap();

    let path = report.build_dir.join("metadata.jsonl");
    let content = std::fs::read_to_string(&path).unwrap();
    let first_line = content.lines().next().unwrap();
    std::fs::write(&path, format!("{first_line}\n")).unwrap();

    assert!(matches!(
        EmbeddingIndex::open(dir.path(), &config(dir.path())),
        Err(IndexError::IndexCorrupt { .. })
    ));
}

#[test]
fn unsupported_format_version_is_corrupt() {
    let dir = tempfile::TempDir::new().unwrap();
    IndexBuilder::new(config(dir.path()))
        .build(&sample_source())
        .unwrap();

    let path = dir.path().join("manifest.json");
    let mut manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    manifest["format_version"] = serde_json::json!(99);
    std::fs::write(&path, manifest.to_string()).unwrap();

    assert!(matches!(
        EmbeddingIndex::open(dir.path(), &config(dir.path())),
        Err(IndexError::IndexCorrupt { .. })
    ));
}

#[test]
fn held_lock_blocks_a_second_build() {
    let dir = tempfile::TempDir::new().unwrap();
    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(dir.path().join(".build.lock"))
        .unwrap();
    let mut lock = fd_lock::RwLock::new(lock_file);
    let _held = lock.try_write().unwrap();

    let err = IndexBuilder::new(config(dir.path()))
        .build(&sample_source())
        .unwrap_err();
    assert!(matches!(err, IndexError::BuildLocked { .. }), "{err}");
}

#[test]
fn all_malformed_input_is_empty_corpus() {
    let source = MemorySource::from_results(vec![
        Err(ParseError::InvalidJson {
            ordinal: 0,
            message: "eof".into(),
        }),
        Err(ParseError::MissingIdentity {
            ordinal: 1,
            field: "id",
        }),
    ]);
    let dir = tempfile::TempDir::new().unwrap();
    let err = IndexBuilder::new(config(dir.path())).build(&source).unwrap_err();
    assert!(matches!(err, IndexError::EmptyCorpus { malformed: 2 }));
    assert!(!dir.path().join("manifest.json").exists());
}

#[test]
fn first_valid_record_fixes_dimension() {
    let source = MemorySource::new(vec![
        record("a", "A", vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]),
        record("b", "B", vec![1.0, 0.0, 0.0], vec![1.0, 0.0, 0.0], vec![1.0, 0.0, 0.0]),
        record("c", "C", vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0, 1.0]),
    ]);
    let dir = tempfile::TempDir::new().unwrap();
    let report = IndexBuilder::new(config(dir.path())).build(&source).unwrap();
    assert_eq!(report.stats().rows, 2);
    assert_eq!(report.stats().malformed, 1);
    assert_eq!(report.stats().dims, 2);
}

#[test]
fn max_records_caps_the_build() {
    let source = MemorySource::new(synthetic_records(50, 8, 11));
    let dir = tempfile::TempDir::new().unwrap();
    let cfg = IndexConfig {
        max_records: Some(20),
        ..config(dir.path())
    };
    let report = IndexBuilder::new(cfg).build(&source).unwrap();
    assert_eq!(report.stats().records_seen, 20);
    assert_eq!(report.stats().rows, 20);
}

/// Yields a different record set on every pass.
struct ShiftingSource {
    passes: AtomicUsize,
}

impl RecordSource for ShiftingSource {
    fn open(&self) -> Result<RecordStream<'_>, IndexError> {
        let pass = self.passes.fetch_add(1, Ordering::SeqCst);
        let count = if pass == 0 { 3 } else { 2 };
        let records: Vec<JobRecord> = synthetic_records(count, 4, 5);
        Ok(Box::new(
            records
                .into_iter()
                .map(|r| -> Result<RecordResult, IndexError> { Ok(Ok(r)) }),
        ))
    }

    fn describe(&self) -> String {
        "shifting".into()
    }
}

#[test]
fn input_changed_between_passes_fails_and_cleans_up() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = IndexBuilder::new(config(dir.path()))
        .build(&ShiftingSource {
            passes: AtomicUsize::new(0),
        })
        .unwrap_err();
    assert!(matches!(err, IndexError::InputChanged { .. }), "{err}");
    assert!(!dir.path().join("manifest.json").exists());
    let leftover = std::fs::read_dir(dir.path().join("builds")).unwrap().count();
    assert_eq!(leftover, 0);
}

#[test]
fn similarity_validates_queries() {
    let dir = tempfile::TempDir::new().unwrap();
    IndexBuilder::new(config(dir.path()))
        .build(&sample_source())
        .unwrap();
    let index = EmbeddingIndex::open(dir.path(), &config(dir.path())).unwrap();

    assert!(matches!(
        index.similarity(EmbeddingSpace::Explicit, &[1.0, 0.0]),
        Err(ValidationError::DimensionMismatch { expected: 4, actual: 2, .. })
    ));
    assert!(matches!(
        index.similarity(EmbeddingSpace::Explicit, &[1.0, f32::NAN, 0.0, 0.0]),
        Err(ValidationError::NonFiniteVector { position: 1, .. })
    ));

    // Query is re-normalized: scaling it does not change cosines.
    let a = index.similarity(EmbeddingSpace::Explicit, &[1.0, 0.0, 0.0, 0.0]).unwrap();
    let b = index.similarity(EmbeddingSpace::Explicit, &[5.0, 0.0, 0.0, 0.0]).unwrap();
    assert_eq!(a, b);
    assert!((a[0] - 1.0).abs() < 1e-6);
}

#[test]
fn metadata_survives_the_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    IndexBuilder::new(config(dir.path()))
        .build(&sample_source())
        .unwrap();
    let index = EmbeddingIndex::open(dir.path(), &config(dir.path())).unwrap();

    let first = index.metadata(0).unwrap();
    assert_eq!(first.company_name.as_deref(), Some("Northwind"));
    assert_eq!(first.remote_type.as_deref(), Some("remote"));
    assert_eq!(first.salary_min, Some(150000.0));
    assert_eq!(first.required_skills, vec!["Rust".to_string(), "PostgreSQL".to_string()]);
    assert!(index.metadata(3).is_none());
}

#[test]
fn invalid_utf8_row_is_counted_not_fatal() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = dir.path().join("in.jsonl");
    let mut bytes = Vec::new();
    for (i, id) in ["good-1", "good-2"].iter().enumerate() {
        let posting = PostingBuilder::new(id, "Engineer")
            .company(id)
            .vector(&unit(3, i))
            .build();
        bytes.extend_from_slice(posting.to_string().as_bytes());
        bytes.push(b'\n');
        if i == 0 {
            bytes.extend_from_slice(b"{\"id\":\"bad\xff\"}\n");
        }
    }
    std::fs::write(&input, bytes).unwrap();

    let index_dir = dir.path().join("index");
    let report = IndexBuilder::new(config(&index_dir))
        .build(&JsonlSource::new(&input))
        .unwrap();
    assert_eq!(report.stats().rows, 2);
    assert_eq!(report.stats().malformed, 1);
}

fn keyed_record(ordinal: usize, title: usize, company: usize, shout: bool) -> JobRecord {
    let mut title = format!("Engineer {title}");
    let mut company = format!("Acme {company}");
    if shout {
        title = title.to_uppercase();
        company = format!("  {}", company.to_uppercase());
    }
    let v = unit(4, ordinal);
    let mut rec = record(&format!("r-{ordinal}"), &title, v.clone(), v.clone(), v);
    rec.metadata.company_name = Some(company);
    rec
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn dedup_keeps_the_earliest_posting_per_key(
        keys in prop::collection::vec((0usize..4, 0usize..3, any::<bool>()), 1..24)
    ) {
        let records: Vec<JobRecord> = keys
            .iter()
            .enumerate()
            .map(|(i, &(t, c, shout))| keyed_record(i, t, c, shout))
            .collect();

        let mut seen = HashSet::new();
        let expected: Vec<String> = keys
            .iter()
            .enumerate()
            .filter(|(_, &(t, c, _))| seen.insert((t, c)))
            .map(|(i, _)| format!("r-{i}"))
            .collect();

        let dir = tempfile::TempDir::new().unwrap();
        let report = IndexBuilder::new(config(dir.path()))
            .build(&MemorySource::new(records))
            .unwrap();
        prop_assert_eq!(report.stats().rows, expected.len());
        prop_assert_eq!(report.stats().duplicates as usize, keys.len() - expected.len());

        let index = EmbeddingIndex::open(dir.path(), &config(dir.path())).unwrap();
        let ids: Vec<String> = (0..index.rows())
            .map(|r| index.table().id(r).unwrap().to_string())
            .collect();
        prop_assert_eq!(ids, expected);
    }
}
