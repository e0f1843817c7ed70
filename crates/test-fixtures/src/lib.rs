//! Fixture helpers shared by the jobsearch integration tests: golden posting
//! files, a fluent raw-posting builder, and a deterministic synthetic corpus.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use jobsearch_core::models::{JobEmbeddings, JobMetadata, JobRecord};

/// Root directory of the fixture data files.
pub fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixture_path(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Write postings as JSONL, one per line.
///
/// # Panics
/// Panics on any I/O error.
pub fn write_jsonl(path: &Path, postings: &[Value]) {
    let mut file = std::fs::File::create(path)
        .unwrap_or_else(|e| panic!("Failed to create {}: {}", path.display(), e));
    for p in postings {
        writeln!(file, "{p}").unwrap_or_else(|e| panic!("Failed to write {}: {}", path.display(), e));
    }
}

/// Basis vector `e_axis` of length `dims`.
pub fn unit(dims: usize, axis: usize) -> Vec<f32> {
    let mut v = vec![0.0; dims];
    v[axis % dims] = 1.0;
    v
}

/// Unit-length blend `cos(theta) e_a + sin(theta) e_b` hitting a chosen
/// cosine against `e_a`.
pub fn blend(dims: usize, a: usize, b: usize, cos_to_a: f32) -> Vec<f32> {
    let mut v = vec![0.0; dims];
    v[a] = cos_to_a;
    v[b] += (1.0 - cos_to_a * cos_to_a).max(0.0).sqrt();
    v
}

/// Fluent builder for raw upstream postings.
#[derive(Debug, Clone)]
pub struct PostingBuilder {
    value: Value,
}

impl PostingBuilder {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            value: json!({
                "id": id,
                "job_information": { "title": title },
                "v7_processed_job_data": {},
                "v5_processed_job_data": {},
            }),
        }
    }

    pub fn company(mut self, name: &str) -> Self {
        self.value["v5_processed_company_data"]["name"] = json!(name);
        self
    }

    pub fn public_company(mut self) -> Self {
        self.value["v5_processed_company_data"]["is_public_company"] = json!(true);
        self
    }

    pub fn industries(mut self, industries: &[&str]) -> Self {
        self.value["v5_processed_company_data"]["industries"] = json!(industries);
        self
    }

    pub fn description(mut self, html: &str) -> Self {
        self.value["job_information"]["description"] = json!(html);
        self
    }

    pub fn remote(mut self, workplace_type: &str) -> Self {
        self.value["v7_processed_job_data"]["work_arrangement"]["workplace_type"] =
            json!(workplace_type);
        self
    }

    pub fn seniority(mut self, level: &str) -> Self {
        self.value["v7_processed_job_data"]["experience_requirements"]["seniority_level"] =
            json!(level);
        self
    }

    pub fn salary(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.value["v5_processed_job_data"]["yearly_min_compensation"] = json!(min);
        self.value["v5_processed_job_data"]["yearly_max_compensation"] = json!(max);
        self
    }

    pub fn skills(mut self, skills: &[&str]) -> Self {
        let items: Vec<Value> = skills.iter().map(|s| json!({ "value": s })).collect();
        self.value["v7_processed_job_data"]["skills"]["explicit"] = Value::Array(items);
        self
    }

    /// Same vector in all three spaces.
    pub fn vector(self, v: &[f32]) -> Self {
        self.vectors(v, v, v)
    }

    pub fn vectors(mut self, explicit: &[f32], inferred: &[f32], company: &[f32]) -> Self {
        let v7 = &mut self.value["v7_processed_job_data"];
        v7["embedding_explicit_vector"] = json!(explicit);
        v7["embedding_inferred_vector"] = json!(inferred);
        v7["embedding_company_vector"] = json!(company);
        self
    }

    pub fn build(self) -> Value {
        self.value
    }
}

/// A parsed record built directly, for tests that skip JSON.
pub fn record(id: &str, title: &str, explicit: Vec<f32>, inferred: Vec<f32>, company: Vec<f32>) -> JobRecord {
    JobRecord {
        metadata: JobMetadata::new(id, title),
        embeddings: JobEmbeddings {
            explicit,
            inferred,
            company,
        },
    }
}

/// Deterministic splitmix64 stream.
#[derive(Debug, Clone)]
pub struct SplitMix(u64);

impl SplitMix {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in [-1, 1).
    pub fn next_f32(&mut self) -> f32 {
        ((self.next_u64() >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
    }

    pub fn vector(&mut self, dims: usize) -> Vec<f32> {
        (0..dims).map(|_| self.next_f32()).collect()
    }
}

const REMOTE_TYPES: &[&str] = &["remote", "hybrid", "onsite"];
const SENIORITY: &[&str] = &["entry level", "mid level", "senior level", "director"];
const INDUSTRIES: &[&str] = &["software", "healthcare", "finance", "education", "retail"];

/// `n` synthetic raw postings with random `dims`-length vectors and a spread
/// of structured fields, some left null.
pub fn synthetic_postings(n: usize, dims: usize, seed: u64) -> Vec<Value> {
    let mut rng = SplitMix::new(seed);
    (0..n)
        .map(|i| {
            let mut b = PostingBuilder::new(&format!("syn-{i}"), &format!("Role {i}"))
                .company(&format!("Company {}", i % 97))
                .vectors(&rng.vector(dims), &rng.vector(dims), &rng.vector(dims));
            let pick = rng.next_u64() as usize;
            if pick % 5 != 0 {
                b = b.remote(REMOTE_TYPES[pick % REMOTE_TYPES.len()]);
            }
            if pick % 7 != 0 {
                b = b.seniority(SENIORITY[pick % SENIORITY.len()]);
            }
            if pick % 3 != 0 {
                let base = 60_000.0 + (pick % 120) as f64 * 1_000.0;
                b = b.salary(Some(base), Some(base + 40_000.0));
            }
            if pick % 4 != 0 {
                b = b.industries(&[INDUSTRIES[pick % INDUSTRIES.len()]]);
            }
            b.build()
        })
        .collect()
}

/// Synthetic parsed records (no JSON round trip).
pub fn synthetic_records(n: usize, dims: usize, seed: u64) -> Vec<JobRecord> {
    let mut rng = SplitMix::new(seed);
    (0..n)
        .map(|i| {
            record(
                &format!("syn-{i}"),
                &format!("Role {i}"),
                rng.vector(dims),
                rng.vector(dims),
                rng.vector(dims),
            )
        })
        .collect()
}
