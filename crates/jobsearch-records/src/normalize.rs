//! Field-level coercions for loosely-typed upstream JSON.

use std::collections::HashSet;

use serde_json::Value;

/// A finite number from a JSON number or numeric string.
pub fn safe_float(value: Option<&Value>) -> Option<f64> {
    let v = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Trimmed text of a string or number; blank is `None`.
pub fn clean_str(value: Option<&Value>) -> Option<String> {
    let s = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// `clean_str`, lowercased. Used for every categorical field.
pub fn normalize_str(value: Option<&Value>) -> Option<String> {
    clean_str(value).map(|s| s.to_lowercase())
}

/// Non-profit beats public; any named company is otherwise private.
pub fn derive_company_type(company: Option<&Value>) -> Option<String> {
    let company = company?;
    let flag = |key: &str| company.get(key).and_then(Value::as_bool).unwrap_or(false);
    if flag("is_non_profit") {
        Some("non-profit".to_string())
    } else if flag("is_public_company") {
        Some("public".to_string())
    } else if clean_str(company.get("name")).is_some() {
        Some("private".to_string())
    } else {
        None
    }
}

/// Trimmed strings of a JSON array, case-insensitively deduplicated in
/// first-seen order.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    dedup_first_seen(items.iter().filter_map(|v| clean_str(Some(v))))
}

pub fn dedup_first_seen(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}
