//! Raw posting -> `JobRecord`.
//!
//! Where the upstream document carries a field twice, the normalized (v5)
//! source wins whenever it is non-null:
//! - company name: `v5_processed_company_data.name` over `job_information.company_info.name`
//! - location: `v5_processed_job_data.formatted_workplace_location` over the first
//!   v7 workplace location
//! - salary: `v5_processed_job_data.yearly_{min,max}_compensation` over
//!   `v7_processed_job_data.compensation_and_benefits.salary.{low,high}`

use serde_json::Value;

use jobsearch_core::errors::ParseError;
use jobsearch_core::models::{EmbeddingSpace, GeoPoint, JobEmbeddings, JobMetadata, JobRecord};

use crate::html::strip_html;
use crate::normalize::{
    clean_str, dedup_first_seen, derive_company_type, normalize_str, safe_float, string_list,
};

/// Parse one raw posting. `ordinal` is its position in the input stream and
/// only appears in errors.
pub fn parse_posting(raw: &Value, ordinal: u64) -> Result<JobRecord, ParseError> {
    let id = clean_str(raw.get("id")).ok_or(ParseError::MissingIdentity {
        ordinal,
        field: "id",
    })?;
    let title = clean_str(raw.pointer("/job_information/title")).ok_or(
        ParseError::MissingIdentity {
            ordinal,
            field: "title",
        },
    )?;

    let embeddings = parse_embeddings(raw, ordinal)?;

    let v7 = raw.get("v7_processed_job_data");
    let v5_job = raw.get("v5_processed_job_data");
    let v5_company = raw.get("v5_processed_company_data");

    let company_name = clean_str(at(v5_company, "/name"))
        .or_else(|| clean_str(raw.pointer("/job_information/company_info/name")));

    let location = clean_str(at(v5_job, "/formatted_workplace_location"))
        .or_else(|| first_workplace_location(at(v7, "/work_arrangement/workplace_locations")));

    let salary_min = safe_float(at(v5_job, "/yearly_min_compensation"))
        .or_else(|| safe_float(at(v7, "/compensation_and_benefits/salary/low")));
    let salary_max = safe_float(at(v5_job, "/yearly_max_compensation"))
        .or_else(|| safe_float(at(v7, "/compensation_and_benefits/salary/high")));

    let description = raw
        .pointer("/job_information/description")
        .and_then(Value::as_str)
        .map(strip_html)
        .filter(|s| !s.is_empty());

    let required_skills = match at(v7, "/skills/explicit") {
        Some(Value::Array(items)) => dedup_first_seen(
            items
                .iter()
                .filter_map(|s| clean_str(s.get("value"))),
        ),
        _ => Vec::new(),
    };

    let coordinates = raw
        .get("_geoloc")
        .and_then(Value::as_array)
        .and_then(|points| points.first())
        .and_then(|p| {
            Some(GeoPoint {
                lat: safe_float(p.get("lat"))?,
                lon: safe_float(p.get("lon"))?,
            })
        });

    let metadata = JobMetadata {
        id,
        apply_url: clean_str(raw.get("apply_url")),
        title,
        company_name,
        location,
        description,
        seniority_level: normalize_str(at(v7, "/experience_requirements/seniority_level")),
        remote_type: normalize_str(at(v7, "/work_arrangement/workplace_type")),
        employment_type: normalize_str(at(v7, "/work_arrangement/commitment/0")),
        company_type: derive_company_type(v5_company),
        salary_min,
        salary_max,
        required_skills,
        industries: string_list(at(v5_company, "/industries")),
        coordinates,
    };

    Ok(JobRecord {
        metadata,
        embeddings,
    })
}

/// JSON-pointer lookup under an optional sub-document.
fn at<'a>(root: Option<&'a Value>, path: &str) -> Option<&'a Value> {
    root.and_then(|v| v.pointer(path))
}

fn first_workplace_location(locations: Option<&Value>) -> Option<String> {
    let first = locations?.as_array()?.first()?;
    let parts: Vec<String> = ["city", "state", "country_code"]
        .iter()
        .filter_map(|k| clean_str(first.get(*k)))
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn parse_embeddings(raw: &Value, ordinal: u64) -> Result<JobEmbeddings, ParseError> {
    let explicit = parse_vector(raw, EmbeddingSpace::Explicit, ordinal)?;
    let inferred = parse_vector(raw, EmbeddingSpace::Inferred, ordinal)?;
    let company = parse_vector(raw, EmbeddingSpace::Company, ordinal)?;

    for other in [&inferred, &company] {
        if other.len() != explicit.len() {
            return Err(ParseError::DimensionMismatch {
                ordinal,
                expected: explicit.len(),
                actual: other.len(),
            });
        }
    }

    Ok(JobEmbeddings {
        explicit,
        inferred,
        company,
    })
}

fn parse_vector(raw: &Value, space: EmbeddingSpace, ordinal: u64) -> Result<Vec<f32>, ParseError> {
    let key = match space {
        EmbeddingSpace::Explicit => "/v7_processed_job_data/embedding_explicit_vector",
        EmbeddingSpace::Inferred => "/v7_processed_job_data/embedding_inferred_vector",
        EmbeddingSpace::Company => "/v7_processed_job_data/embedding_company_vector",
    };
    let missing = ParseError::MissingEmbedding {
        ordinal,
        space: space.as_str(),
    };
    let items = match raw.pointer(key) {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(missing),
    };

    let mut vector = Vec::with_capacity(items.len());
    let mut sum_sq = 0.0_f64;
    for (position, item) in items.iter().enumerate() {
        let component = item.as_f64().map(|v| v as f32).filter(|v| v.is_finite());
        let Some(c) = component else {
            return Err(ParseError::NonFiniteEmbedding {
                ordinal,
                space: space.as_str(),
                position,
            });
        };
        sum_sq += f64::from(c) * f64::from(c);
        vector.push(c);
    }

    if sum_sq == 0.0 {
        return Err(ParseError::ZeroNormEmbedding {
            ordinal,
            space: space.as_str(),
        });
    }
    Ok(vector)
}
