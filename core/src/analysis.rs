//! Set-based analyses over out-neighborhoods: degree centrality and
//! Jaccard alignment with a reference community.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::graph::{AdjacencyIndex, NodeId};

/// Degree information for a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegreeResult {
    pub node_id: NodeId,
    pub out_degree: usize,
}

/// Return nodes ranked by out-degree.
///
/// If `top_n` is 0, returns all nodes. Otherwise returns the top N by
/// degree (descending). Ties are broken by node ID (ascending).
pub fn degree_centrality(index: &AdjacencyIndex, top_n: usize) -> Vec<DegreeResult> {
    let mut results: Vec<DegreeResult> = index
        .nodes()
        .map(|node_id| DegreeResult {
            node_id,
            out_degree: index.degree(node_id),
        })
        .collect();

    results.sort_by(|a, b| {
        b.out_degree
            .cmp(&a.out_degree)
            .then(a.node_id.cmp(&b.node_id))
    });

    if top_n > 0 && top_n < results.len() {
        results.truncate(top_n);
    }

    results
}

/// `|a ∩ b| / |a ∪ b|`, or `None` when both sets are empty.
pub fn jaccard_index(a: &HashSet<NodeId>, b: &HashSet<NodeId>) -> Option<f64> {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|n| large.contains(n)).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return None;
    }
    Some(intersection as f64 / union as f64)
}

/// How a community's out-neighborhoods are compared against a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignmentMode {
    /// Against the union of every member's out-neighbors.
    #[default]
    Combined,
    /// Mean of the similarity against each member separately.
    PerMember,
}

/// Jaccard alignment of every non-member node with out-edges against the
/// community's out-neighborhoods.
///
/// Candidates always have out-edges, so no comparison has an empty union.
/// An empty community yields no scores.
pub fn community_alignment(
    index: &AdjacencyIndex,
    community: &[NodeId],
    mode: AlignmentMode,
) -> Vec<(NodeId, f64)> {
    let members: HashSet<NodeId> = community.iter().copied().collect();
    if members.is_empty() {
        return Vec::new();
    }
    let member_sets: Vec<HashSet<NodeId>> = members
        .iter()
        .map(|&m| out_set(index, m))
        .collect();
    let combined: HashSet<NodeId> = member_sets.iter().flatten().copied().collect();

    let candidates: Vec<NodeId> = index
        .nodes()
        .filter(|n| index.degree(*n) > 0 && !members.contains(n))
        .collect();

    candidates
        .par_iter()
        .map(|&node| {
            let own = out_set(index, node);
            let score = match mode {
                AlignmentMode::Combined => jaccard_index(&own, &combined).unwrap_or(0.0),
                AlignmentMode::PerMember => {
                    let total: f64 = member_sets
                        .iter()
                        .map(|set| jaccard_index(&own, set).unwrap_or(0.0))
                        .sum();
                    total / member_sets.len() as f64
                }
            };
            (node, score)
        })
        .collect()
}

fn out_set(index: &AdjacencyIndex, node: NodeId) -> HashSet<NodeId> {
    index.neighbors(node).iter().copied().collect()
}
