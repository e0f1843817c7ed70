//! Partial top-k selection with a total, deterministic order.

use std::cmp::Ordering;

/// Score descending, then row ascending.
pub fn rank_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// The `k` best `(row, score)` pairs in rank order.
///
/// Selection is O(n) and only the survivors are sorted.
pub fn select_top_k(mut scored: Vec<(usize, f32)>, k: usize) -> Vec<(usize, f32)> {
    if k == 0 {
        return Vec::new();
    }
    if scored.len() > k {
        scored.select_nth_unstable_by(k - 1, rank_order);
        scored.truncate(k);
    }
    scored.sort_unstable_by(rank_order);
    scored
}
