//! Top-k selection by score.

use std::cmp::Ordering;

use crate::graph::NodeId;

/// A node with its ranking score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredNode {
    pub node_id: NodeId,
    pub score: f64,
}

impl From<(NodeId, f64)> for ScoredNode {
    fn from((node_id, score): (NodeId, f64)) -> Self {
        Self { node_id, score }
    }
}

/// Descending score, then ascending key as the secondary key.
fn by_score_desc<K: Ord>(a: &(K, f64), b: &(K, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// The `n` highest-scoring entries, best first.
///
/// `None` returns the input unchanged, in input order. Ties on score are
/// broken by ascending key so the result is deterministic. Runs in
/// O(m + n log n) for `m` entries: a linear selection of the top `n`
/// followed by a sort of just those.
pub fn top_n<K, I>(scores: I, n: Option<usize>) -> Vec<(K, f64)>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut entries: Vec<(K, f64)> = scores.into_iter().collect();
    let Some(n) = n else {
        return entries;
    };
    if n == 0 {
        return Vec::new();
    }
    if n < entries.len() {
        entries.select_nth_unstable_by(n - 1, by_score_desc);
        entries.truncate(n);
    }
    entries.sort_unstable_by(by_score_desc);
    entries
}
