//! Up-front query validation. Nothing is scored unless this passes.

use jobsearch_core::errors::ValidationError;
use jobsearch_core::models::{EmbeddingSpace, FilterValue, Intent, QueryVectors};
use jobsearch_core::vector::first_non_finite;

pub fn validate(intent: &Intent, top_k: usize, dims: usize) -> Result<(), ValidationError> {
    if top_k == 0 {
        return Err(ValidationError::ZeroTopK);
    }

    for (space, weight) in intent.weights.iter() {
        if !weight.is_finite() {
            return Err(ValidationError::NonFiniteWeight {
                space: space.as_str(),
                value: weight,
            });
        }
    }

    match &intent.query {
        QueryVectors::Shared(v) => check_vector("query", v, dims)?,
        QueryVectors::PerSpace { .. } => {
            for space in EmbeddingSpace::ALL {
                check_vector(&format!("query.{space}"), intent.query.get(space), dims)?;
            }
        }
    }

    for term in &intent.exclusions {
        check_vector(&format!("exclusion '{}'", term.term), &term.vector, dims)?;
    }

    for (field, value) in intent.filters.iter() {
        if value.kind() != field.kind() {
            return Err(ValidationError::FilterKindMismatch {
                field: field.as_str(),
                expected: field.kind().as_str(),
            });
        }
        if let FilterValue::NumericLowerBound(threshold) = value {
            if !threshold.is_finite() {
                return Err(ValidationError::NonFiniteThreshold {
                    field: field.as_str(),
                });
            }
        }
    }

    Ok(())
}

fn check_vector(label: &str, v: &[f32], dims: usize) -> Result<(), ValidationError> {
    if v.len() != dims {
        return Err(ValidationError::DimensionMismatch {
            vector: label.to_string(),
            expected: dims,
            actual: v.len(),
        });
    }
    if let Some(position) = first_non_finite(v) {
        return Err(ValidationError::NonFiniteVector {
            vector: label.to_string(),
            position,
        });
    }
    Ok(())
}
