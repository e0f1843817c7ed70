//! Small dense-vector helpers. All loops are sequential so results are
//! bit-identical across runs.

use crate::constants::NORM_EPSILON;

/// Dot product over the shorter of the two slices.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Scale `v` in place to unit length: `v / max(|v|, eps)`.
pub fn normalize_in_place(v: &mut [f32]) {
    let norm = l2_norm(v).max(NORM_EPSILON);
    for x in v.iter_mut() {
        *x /= norm;
    }
}

/// Unit-length copy of `v`.
pub fn normalized(v: &[f32]) -> Vec<f32> {
    let mut out = v.to_vec();
    normalize_in_place(&mut out);
    out
}

/// Position of the first NaN or infinite component.
pub fn first_non_finite(v: &[f32]) -> Option<usize> {
    v.iter().position(|x| !x.is_finite())
}

/// Cosine similarity. Zero when either side has zero norm.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let denom = l2_norm(a) * l2_norm(b);
    if denom <= NORM_EPSILON {
        return 0.0;
    }
    dot(a, b) / denom
}
