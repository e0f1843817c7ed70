//! Similarity and exclusion passes over the whole corpus.

use jobsearch_core::config::ExclusionScope;
use jobsearch_core::errors::ValidationError;
use jobsearch_core::models::{EmbeddingSpace, ExclusionTerm, QueryVectors, SpaceWeights};
use jobsearch_index::EmbeddingIndex;

/// `sum_s w_s * cos(q_s, row_s)` for every row. Zero-weight spaces are
/// skipped; weights are taken as given apart from clamping negatives.
pub fn weighted_similarity(
    index: &EmbeddingIndex,
    query: &QueryVectors,
    weights: SpaceWeights,
) -> Result<Vec<f32>, ValidationError> {
    let mut total = vec![0.0_f32; index.rows()];
    for (space, weight) in weights.clamped().iter() {
        if weight == 0.0 {
            continue;
        }
        let sims = index.similarity(space, query.get(space))?;
        for (t, s) in total.iter_mut().zip(sims) {
            *t += weight * s;
        }
    }
    Ok(total)
}

/// Per-row maximum cosine between any exclusion term and the row, over the
/// spaces `scope` selects. `None` when there are no terms.
pub fn exclusion_strength(
    index: &EmbeddingIndex,
    exclusions: &[ExclusionTerm],
    scope: ExclusionScope,
) -> Result<Option<Vec<f32>>, ValidationError> {
    if exclusions.is_empty() {
        return Ok(None);
    }
    let spaces: &[EmbeddingSpace] = match scope {
        ExclusionScope::Inferred => &[EmbeddingSpace::Inferred],
        ExclusionScope::AllSpaces => &EmbeddingSpace::ALL,
    };

    let mut strongest = vec![f32::NEG_INFINITY; index.rows()];
    for term in exclusions {
        for space in spaces {
            let sims = index.similarity(*space, &term.vector)?;
            for (m, s) in strongest.iter_mut().zip(sims) {
                *m = m.max(s);
            }
        }
    }
    Ok(Some(strongest))
}
