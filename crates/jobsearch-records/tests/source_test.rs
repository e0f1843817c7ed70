//! JSONL streaming over the golden sample file and generated corpora.

use jobsearch_core::errors::ParseError;
use jobsearch_records::{JsonlSource, RecordSource};
use test_fixtures::{fixture_path, synthetic_postings, write_jsonl, PostingBuilder};

fn collect(source: &JsonlSource) -> Vec<Result<jobsearch_core::JobRecord, ParseError>> {
    source
        .open()
        .unwrap()
        .map(|item| item.unwrap())
        .collect()
}

#[test]
fn sample_file_yields_records_and_parse_errors() {
    let source = JsonlSource::new(fixture_path("postings/sample.jsonl"));
    let items = collect(&source);

    // Blank line skipped; six non-blank lines.
    assert_eq!(items.len(), 6);
    assert_eq!(items[0].as_ref().unwrap().metadata.id, "sample-1");
    assert!(matches!(
        items[3],
        Err(ParseError::ZeroNormEmbedding { ordinal: 3, .. })
    ));
    assert!(matches!(items[4], Err(ParseError::InvalidJson { ordinal: 4, .. })));

    let designer = items[5].as_ref().unwrap();
    assert_eq!(designer.metadata.salary_min, Some(95000.0));
    assert_eq!(designer.metadata.remote_type.as_deref(), Some("hybrid"));
}

#[test]
fn description_html_is_stripped() {
    let source = JsonlSource::new(fixture_path("postings/sample.jsonl"));
    let first = collect(&source).remove(0).unwrap();
    assert_eq!(
        first.metadata.description.as_deref(),
        Some("Own our Rust services.")
    );
}

#[test]
fn reopening_restarts_the_stream() {
    let source = JsonlSource::new(fixture_path("postings/sample.jsonl"));
    let first: Vec<_> = collect(&source);
    let second: Vec<_> = collect(&source);
    assert_eq!(first, second);
}

#[test]
fn max_records_limits_the_stream() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("jobs.jsonl");
    write_jsonl(&path, &synthetic_postings(20, 8, 7));

    let source = JsonlSource::new(&path).with_max_records(Some(5));
    let items = collect(&source);
    assert_eq!(items.len(), 5);
    assert!(items.iter().all(|r| r.is_ok()));
}

#[test]
fn missing_file_is_fatal() {
    let source = JsonlSource::new("/definitely/not/here.jsonl");
    assert!(source.open().is_err());
}

#[test]
fn builder_postings_parse() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("jobs.jsonl");
    write_jsonl(
        &path,
        &[PostingBuilder::new("b-1", "Nurse")
            .company("Mercy")
            .industries(&["Healthcare"])
            .salary(Some(80_000.0), None)
            .vector(&[0.0, 2.0])
            .build()],
    );

    let rec = collect(&JsonlSource::new(&path)).remove(0).unwrap();
    assert_eq!(rec.metadata.company_type.as_deref(), Some("private"));
    assert_eq!(rec.metadata.salary_min, Some(80_000.0));
    assert!(rec.metadata.salary_max.is_none());
    assert_eq!(rec.embeddings.inferred, vec![0.0, 2.0]);
}

#[test]
fn invalid_utf8_line_is_one_malformed_row() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("jobs.jsonl");
    let good = |id: &str| {
        PostingBuilder::new(id, "Engineer")
            .company(id)
            .vector(&[1.0, 0.0])
            .build()
            .to_string()
    };
    let mut bytes = Vec::new();
    bytes.extend_from_slice(good("ok-1").as_bytes());
    bytes.extend_from_slice(b"\n{\"id\":\"bad\xff\"}\n");
    bytes.extend_from_slice(good("ok-2").as_bytes());
    bytes.extend_from_slice(b"\r\n");
    std::fs::write(&path, bytes).unwrap();

    let items = collect(&JsonlSource::new(&path));
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_ref().unwrap().metadata.id, "ok-1");
    assert!(matches!(items[1], Err(ParseError::InvalidJson { ordinal: 1, .. })));
    assert_eq!(items[2].as_ref().unwrap().metadata.id, "ok-2");
}
