use serde::{Deserialize, Serialize};

use super::space::EmbeddingSpace;

/// A geographic coordinate taken from the posting's geolocation list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Canonical, normalized metadata of one posting.
///
/// Categorical fields are trimmed and lowercased; blank values are `None`.
/// Salaries stay `f64` and are never truncated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub id: String,
    #[serde(default)]
    pub apply_url: Option<String>,
    pub title: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Description with HTML removed.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub seniority_level: Option<String>,
    #[serde(default)]
    pub remote_type: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub company_type: Option<String>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    /// Deduplicated, first-seen order.
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
}

impl JobMetadata {
    /// Minimal metadata with only the identity fields set.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            apply_url: None,
            title: title.into(),
            company_name: None,
            location: None,
            description: None,
            seniority_level: None,
            remote_type: None,
            employment_type: None,
            company_type: None,
            salary_min: None,
            salary_max: None,
            required_skills: Vec::new(),
            industries: Vec::new(),
            coordinates: None,
        }
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(&self.title, self.company_name.as_deref())
    }
}

/// Identity used to collapse reposted jobs: lowercased trimmed title and
/// company (empty when unknown). Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub title: String,
    pub company: String,
}

impl DedupKey {
    pub fn new(title: &str, company: Option<&str>) -> Self {
        Self {
            title: title.trim().to_lowercase(),
            company: company.map(|c| c.trim().to_lowercase()).unwrap_or_default(),
        }
    }
}

/// The three embedding vectors of one posting, all of equal length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEmbeddings {
    pub explicit: Vec<f32>,
    pub inferred: Vec<f32>,
    pub company: Vec<f32>,
}

impl JobEmbeddings {
    pub fn get(&self, space: EmbeddingSpace) -> &[f32] {
        match space {
            EmbeddingSpace::Explicit => &self.explicit,
            EmbeddingSpace::Inferred => &self.inferred,
            EmbeddingSpace::Company => &self.company,
        }
    }

    pub fn get_mut(&mut self, space: EmbeddingSpace) -> &mut Vec<f32> {
        match space {
            EmbeddingSpace::Explicit => &mut self.explicit,
            EmbeddingSpace::Inferred => &mut self.inferred,
            EmbeddingSpace::Company => &mut self.company,
        }
    }

    /// Dimension of the vectors (taken from the explicit space).
    pub fn dims(&self) -> usize {
        self.explicit.len()
    }
}

/// A fully parsed posting: metadata plus embeddings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub metadata: JobMetadata,
    pub embeddings: JobEmbeddings,
}

impl JobRecord {
    pub fn dedup_key(&self) -> DedupKey {
        self.metadata.dedup_key()
    }
}
