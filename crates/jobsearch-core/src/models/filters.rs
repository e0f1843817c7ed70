//! Structured filters: an enumerated field registry with typed values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::UnknownFilterField;

/// Every filter field the ranking engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    RemoteType,
    SeniorityLevel,
    EmploymentType,
    CompanyType,
    MinSalary,
    Industries,
}

/// The single value kind each field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Categorical,
    NumericLowerBound,
    SetIntersection,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Categorical => "categorical",
            Self::NumericLowerBound => "numeric lower bound",
            Self::SetIntersection => "set",
        }
    }
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        Self::RemoteType,
        Self::SeniorityLevel,
        Self::EmploymentType,
        Self::CompanyType,
        Self::MinSalary,
        Self::Industries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoteType => "remote_type",
            Self::SeniorityLevel => "seniority_level",
            Self::EmploymentType => "employment_type",
            Self::CompanyType => "company_type",
            Self::MinSalary => "min_salary",
            Self::Industries => "industries",
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Self::RemoteType | Self::SeniorityLevel | Self::EmploymentType | Self::CompanyType => {
                FilterKind::Categorical
            }
            Self::MinSalary => FilterKind::NumericLowerBound,
            Self::Industries => FilterKind::SetIntersection,
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterField {
    type Err = UnknownFilterField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == key)
            .ok_or_else(|| UnknownFilterField(s.to_string()))
    }
}

/// A typed filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    Categorical(String),
    NumericLowerBound(f64),
    SetIntersection(Vec<String>),
}

impl FilterValue {
    pub fn kind(&self) -> FilterKind {
        match self {
            Self::Categorical(_) => FilterKind::Categorical,
            Self::NumericLowerBound(_) => FilterKind::NumericLowerBound,
            Self::SetIntersection(_) => FilterKind::SetIntersection,
        }
    }

    /// Empty strings and empty sets mean "no filter".
    pub fn is_unset(&self) -> bool {
        match self {
            Self::Categorical(s) => s.trim().is_empty(),
            Self::NumericLowerBound(_) => false,
            Self::SetIntersection(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }

    /// Trimmed, lowercased copy with blank set entries dropped.
    fn normalized(self) -> Self {
        match self {
            Self::Categorical(s) => Self::Categorical(s.trim().to_lowercase()),
            Self::NumericLowerBound(v) => Self::NumericLowerBound(v),
            Self::SetIntersection(items) => Self::SetIntersection(
                items
                    .iter()
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
        }
    }
}

/// Active filters, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<FilterField, FilterValue>);

impl From<BTreeMap<FilterField, FilterValue>> for Filters {
    fn from(map: BTreeMap<FilterField, FilterValue>) -> Self {
        let mut filters = Self::new();
        for (field, value) in map {
            filters.insert(field, value);
        }
        filters
    }
}

// Deserialized values go through `insert` so they are normalized like any other.
impl<'de> Deserialize<'de> for Filters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<FilterField, FilterValue>::deserialize(deserializer).map(Self::from)
    }
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a filter. Unset values (blank string, empty set) are ignored so an
    /// earlier value for the same field survives.
    pub fn insert(&mut self, field: FilterField, value: FilterValue) {
        if value.is_unset() {
            return;
        }
        self.0.insert(field, value.normalized());
    }

    /// Builder-style `insert`.
    pub fn with(mut self, field: FilterField, value: FilterValue) -> Self {
        self.insert(field, value);
        self
    }

    pub fn remove(&mut self, field: FilterField) -> Option<FilterValue> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: FilterField) -> Option<&FilterValue> {
        self.0.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &FilterValue)> {
        self.0.iter().map(|(f, v)| (*f, v))
    }

    pub fn fields(&self) -> impl Iterator<Item = FilterField> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field-wise merge: fields set in `newer` override, absent ones are kept.
    pub fn merge(&mut self, newer: &Filters) {
        for (field, value) in newer.iter() {
            self.insert(field, value.clone());
        }
    }

    /// Parse a loosely-typed key/value map, warning about and dropping keys
    /// outside the registry.
    pub fn from_raw(raw: &serde_json::Map<String, Value>) -> Self {
        let (filters, unknown) = Self::parse_raw(raw);
        for u in &unknown {
            warn!(field = %u.0, "ignoring unknown filter field");
        }
        filters
    }

    /// Like `from_raw` but hands the unknown keys back instead of logging.
    pub fn parse_raw(raw: &serde_json::Map<String, Value>) -> (Self, Vec<UnknownFilterField>) {
        let mut filters = Self::new();
        let mut unknown = Vec::new();

        for (key, value) in raw {
            let field = match key.parse::<FilterField>() {
                Ok(f) => f,
                Err(e) => {
                    unknown.push(e);
                    continue;
                }
            };
            match raw_value(field, value) {
                Some(v) => filters.insert(field, v),
                None if value.is_null() => {}
                None => warn!(field = %field, value = %value, "unsupported filter value, ignoring"),
            }
        }

        (filters, unknown)
    }
}

/// Shape a raw JSON value into a `FilterValue`. The result may still be the
/// wrong kind for `field`; query validation reports that.
fn raw_value(field: FilterField, value: &Value) -> Option<FilterValue> {
    match (field.kind(), value) {
        (_, Value::Null) => None,
        (FilterKind::NumericLowerBound, Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(v) => Some(FilterValue::NumericLowerBound(v)),
            Err(_) => Some(FilterValue::Categorical(s.clone())),
        },
        (FilterKind::SetIntersection, Value::String(s)) => {
            Some(FilterValue::SetIntersection(vec![s.clone()]))
        }
        (_, Value::String(s)) => Some(FilterValue::Categorical(s.clone())),
        (_, Value::Number(n)) => n.as_f64().map(FilterValue::NumericLowerBound),
        (_, Value::Array(items)) => Some(FilterValue::SetIntersection(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )),
        (_, Value::Bool(_)) | (_, Value::Object(_)) => None,
    }
}

const SENIORITY_ALIASES: &[(&str, &[&str])] = &[
    ("entry level", &["entry", "junior", "entry-level"]),
    ("mid level", &["mid", "intermediate", "mid-level"]),
    ("senior level", &["senior", "sr", "senior-level"]),
    ("manager", &["management"]),
    ("director", &[]),
    ("internship", &["intern"]),
];

/// Map a seniority label onto its canonical form ("senior" -> "senior level").
/// Unknown labels come back lowercased and trimmed.
pub fn canonical_seniority(level: &str) -> String {
    let normalized = level.trim().to_lowercase();
    for (canonical, aliases) in SENIORITY_ALIASES {
        if normalized == *canonical || aliases.contains(&normalized.as_str()) {
            return (*canonical).to_string();
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> serde_json::Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn unknown_keys_are_reported_and_dropped() {
        let (filters, unknown) = Filters::parse_raw(&map(json!({
            "remote_type": "Remote",
            "favorite_color": "blue",
        })));
        assert_eq!(filters.len(), 1);
        assert_eq!(
            filters.get(FilterField::RemoteType),
            Some(&FilterValue::Categorical("remote".into()))
        );
        assert_eq!(unknown, vec![UnknownFilterField("favorite_color".into())]);
    }

    #[test]
    fn raw_values_take_field_shape() {
        let filters = Filters::from_raw(&map(json!({
            "min_salary": "120000",
            "industries": "Healthcare",
            "seniority_level": null,
        })));
        assert_eq!(
            filters.get(FilterField::MinSalary),
            Some(&FilterValue::NumericLowerBound(120_000.0))
        );
        assert_eq!(
            filters.get(FilterField::Industries),
            Some(&FilterValue::SetIntersection(vec!["healthcare".into()]))
        );
        assert!(filters.get(FilterField::SeniorityLevel).is_none());
    }

    #[test]
    fn blank_values_do_not_override() {
        let mut filters = Filters::new().with(
            FilterField::RemoteType,
            FilterValue::Categorical("remote".into()),
        );
        filters.insert(FilterField::RemoteType, FilterValue::Categorical("  ".into()));
        filters.insert(FilterField::Industries, FilterValue::SetIntersection(vec![]));
        assert_eq!(filters.len(), 1);
    }

    #[test]
    fn merge_overrides_set_fields_only() {
        let mut base = Filters::new()
            .with(FilterField::RemoteType, FilterValue::Categorical("remote".into()))
            .with(FilterField::MinSalary, FilterValue::NumericLowerBound(100_000.0));
        let newer = Filters::new().with(FilterField::MinSalary, FilterValue::NumericLowerBound(150_000.0));
        base.merge(&newer);
        assert_eq!(
            base.get(FilterField::RemoteType),
            Some(&FilterValue::Categorical("remote".into()))
        );
        assert_eq!(
            base.get(FilterField::MinSalary),
            Some(&FilterValue::NumericLowerBound(150_000.0))
        );
    }

    #[test]
    fn deserialized_values_are_normalized() {
        let filters: Filters = serde_json::from_value(json!({
            "remote_type": {"kind": "categorical", "value": " Remote "},
            "employment_type": {"kind": "categorical", "value": "  "},
            "industries": {"kind": "set_intersection", "value": ["Healthcare", ""]},
        }))
        .unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(
            filters.get(FilterField::RemoteType),
            Some(&FilterValue::Categorical("remote".into()))
        );
        assert_eq!(
            filters.get(FilterField::Industries),
            Some(&FilterValue::SetIntersection(vec!["healthcare".into()]))
        );
    }

    #[test]
    fn seniority_aliases_canonicalize() {
        assert_eq!(canonical_seniority("Senior"), "senior level");
        assert_eq!(canonical_seniority("senior level"), "senior level");
        assert_eq!(canonical_seniority("junior"), "entry level");
        assert_eq!(canonical_seniority(" Staff "), "staff");
    }

    #[test]
    fn field_names_round_trip_through_from_str() {
        for field in FilterField::ALL {
            assert_eq!(field.as_str().parse::<FilterField>(), Ok(field));
        }
    }
}
