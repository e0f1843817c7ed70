//! Columnar (struct-of-arrays) metadata, row-aligned with the matrices.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use jobsearch_core::errors::IndexError;
use jobsearch_core::models::{FilterField, GeoPoint, JobMetadata};

/// Dictionary-encoded categorical column. Values are stored lowercased.
#[derive(Debug, Clone, Default)]
pub struct DictColumn {
    dict: Vec<String>,
    lookup: HashMap<String, u32>,
    codes: Vec<Option<u32>>,
}

impl DictColumn {
    pub fn push(&mut self, value: Option<&str>) {
        let code = value.map(|v| self.intern(&v.trim().to_lowercase()));
        self.codes.push(code);
    }

    fn intern(&mut self, value: &str) -> u32 {
        if let Some(code) = self.lookup.get(value) {
            return *code;
        }
        let code = self.dict.len() as u32;
        self.dict.push(value.to_string());
        self.lookup.insert(value.to_string(), code);
        code
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        self.code(row).map(|c| self.dict[c as usize].as_str())
    }

    /// Dictionary code at `row`; `None` for null values and out-of-range rows.
    pub fn code(&self, row: usize) -> Option<u32> {
        self.codes.get(row).copied().flatten()
    }

    /// Distinct values, indexed by code.
    pub fn dictionary(&self) -> &[String] {
        &self.dict
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Dictionary-encoded list column (industries).
#[derive(Debug, Clone, Default)]
pub struct DictListColumn {
    inner: DictColumn,
    rows: Vec<Vec<u32>>,
}

impl DictListColumn {
    pub fn push(&mut self, values: &[String]) {
        let mut codes: Vec<u32> = values
            .iter()
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .map(|v| self.inner.intern(&v))
            .collect();
        codes.dedup();
        self.rows.push(codes);
    }

    /// Codes at `row`; empty for rows with no values.
    pub fn codes(&self, row: usize) -> &[u32] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dictionary(&self) -> &[String] {
        self.inner.dictionary()
    }
}

/// All job metadata of one build, one `Vec` per field.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    ids: Vec<String>,
    titles: Vec<String>,
    apply_urls: Vec<Option<String>>,
    company_names: Vec<Option<String>>,
    locations: Vec<Option<String>>,
    descriptions: Vec<Option<String>>,
    seniority_level: DictColumn,
    remote_type: DictColumn,
    employment_type: DictColumn,
    company_type: DictColumn,
    salary_min: Vec<Option<f64>>,
    salary_max: Vec<Option<f64>>,
    required_skills: Vec<Vec<String>>,
    industry_names: Vec<Vec<String>>,
    industries: DictListColumn,
    coordinates: Vec<Option<GeoPoint>>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `metadata.jsonl`. Undecodable lines mean the build is corrupt.
    pub fn from_jsonl(path: &Path) -> Result<Self, IndexError> {
        let file = File::open(path).map_err(|e| IndexError::io(path, e))?;
        let mut table = Self::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| IndexError::io(path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let meta: JobMetadata = serde_json::from_str(&line).map_err(|e| {
                IndexError::corrupt(format!("{} line {}: {e}", path.display(), line_no + 1))
            })?;
            table.push(meta);
        }
        Ok(table)
    }

    pub fn push(&mut self, meta: JobMetadata) {
        self.seniority_level.push(meta.seniority_level.as_deref());
        self.remote_type.push(meta.remote_type.as_deref());
        self.employment_type.push(meta.employment_type.as_deref());
        self.company_type.push(meta.company_type.as_deref());
        self.industries.push(&meta.industries);
        self.ids.push(meta.id);
        self.titles.push(meta.title);
        self.apply_urls.push(meta.apply_url);
        self.company_names.push(meta.company_name);
        self.locations.push(meta.location);
        self.descriptions.push(meta.description);
        self.salary_min.push(meta.salary_min);
        self.salary_max.push(meta.salary_max);
        self.required_skills.push(meta.required_skills);
        self.industry_names.push(meta.industries);
        self.coordinates.push(meta.coordinates);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Reassemble the row's metadata.
    pub fn row(&self, row: usize) -> Option<JobMetadata> {
        let owned = |c: &DictColumn| c.get(row).map(str::to_string);
        Some(JobMetadata {
            id: self.ids.get(row)?.clone(),
            apply_url: self.apply_urls[row].clone(),
            title: self.titles[row].clone(),
            company_name: self.company_names[row].clone(),
            location: self.locations[row].clone(),
            description: self.descriptions[row].clone(),
            seniority_level: owned(&self.seniority_level),
            remote_type: owned(&self.remote_type),
            employment_type: owned(&self.employment_type),
            company_type: owned(&self.company_type),
            salary_min: self.salary_min[row],
            salary_max: self.salary_max[row],
            required_skills: self.required_skills[row].clone(),
            industries: self.industry_names[row].clone(),
            coordinates: self.coordinates[row],
        })
    }

    pub fn id(&self, row: usize) -> Option<&str> {
        self.ids.get(row).map(String::as_str)
    }

    pub fn title(&self, row: usize) -> Option<&str> {
        self.titles.get(row).map(String::as_str)
    }

    /// Categorical column for a categorical filter field.
    pub fn categorical(&self, field: FilterField) -> Option<&DictColumn> {
        match field {
            FilterField::RemoteType => Some(&self.remote_type),
            FilterField::SeniorityLevel => Some(&self.seniority_level),
            FilterField::EmploymentType => Some(&self.employment_type),
            FilterField::CompanyType => Some(&self.company_type),
            FilterField::MinSalary | FilterField::Industries => None,
        }
    }

    pub fn industries(&self) -> &DictListColumn {
        &self.industries
    }

    pub fn salary_min(&self) -> &[Option<f64>] {
        &self.salary_min
    }

    pub fn salary_max(&self) -> &[Option<f64>] {
        &self.salary_max
    }

    pub fn required_skills(&self, row: usize) -> &[String] {
        self.required_skills.get(row).map(Vec::as_slice).unwrap_or(&[])
    }
}
