use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Account identifier as it appears in the follower data.
pub type NodeId = u64;

/// A directed `(source, target)` edge.
pub type EdgePair = (NodeId, NodeId);

/// Which way a raw follow record is turned into a directed edge.
///
/// Follow data is stored as `(follower, followed)` pairs. `Following`
/// walks from a follower to the accounts it follows; `Followers` walks
/// from an account to the accounts following it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Following,
    Followers,
}

impl Orientation {
    pub fn orient(self, follower: NodeId, followed: NodeId) -> EdgePair {
        match self {
            Orientation::Following => (follower, followed),
            Orientation::Followers => (followed, follower),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Following => "following",
            Orientation::Followers => "followers",
        }
    }
}

/// Half-open `[start, end)` range into the flat neighbor array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extent {
    pub start: usize,
    pub end: usize,
}

impl Extent {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Immutable out-neighbor index: one flat array of neighbor ids plus a
/// per-node extent into it.
///
/// Extents are disjoint and together cover the whole array. A node with
/// no outgoing edges is either absent or has an empty extent; both read
/// as degree 0. The index is built once from the complete edge set and
/// rebuilt wholesale if edges, orientation or directedness change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjacencyIndex {
    neighbors: Vec<NodeId>,
    extents: HashMap<NodeId, Extent>,
    directed: bool,
}

impl AdjacencyIndex {
    /// Build from directed edges. When `directed` is false every edge also
    /// stores its reverse entry, so the array holds `2 * edges.len()` ids.
    ///
    /// Nodes are laid out in first-encounter order. Within an extent the
    /// forward entries come first, in edge order, followed by the reverse
    /// entries, also in edge order. Duplicate edges are kept.
    pub fn build(edges: &[EdgePair], directed: bool) -> Self {
        let total = if directed { edges.len() } else { edges.len() * 2 };

        // Pass 1: degree per source, in encounter order.
        let mut order: Vec<NodeId> = Vec::new();
        let mut counts: HashMap<NodeId, usize> = HashMap::new();
        for &(source, _) in edges {
            tally(&mut counts, &mut order, source);
        }
        if !directed {
            for &(_, target) in edges {
                tally(&mut counts, &mut order, target);
            }
        }

        // Prefix offsets.
        let mut extents = HashMap::with_capacity(order.len());
        let mut cursor = 0usize;
        for node in &order {
            let len = counts[node];
            extents.insert(
                *node,
                Extent {
                    start: cursor,
                    end: cursor + len,
                },
            );
            cursor += len;
        }
        debug_assert_eq!(cursor, total);

        // Pass 2: fill. `counts` is reused as the write cursor per node.
        for node in &order {
            if let Some(c) = counts.get_mut(node) {
                *c = extents[node].start;
            }
        }
        let mut neighbors: Vec<NodeId> = vec![0; total];
        for &(source, target) in edges {
            place(&mut counts, &mut neighbors, source, target);
        }
        if !directed {
            for &(source, target) in edges {
                place(&mut counts, &mut neighbors, target, source);
            }
        }

        tracing::debug!(
            nodes = extents.len(),
            entries = neighbors.len(),
            directed,
            "adjacency index built"
        );

        Self {
            neighbors,
            extents,
            directed,
        }
    }

    /// Build from raw `(follower, followed)` records.
    pub fn from_follows(follows: &[EdgePair], orientation: Orientation, directed: bool) -> Self {
        let edges: Vec<EdgePair> = follows
            .iter()
            .map(|&(follower, followed)| orientation.orient(follower, followed))
            .collect();
        Self::build(&edges, directed)
    }

    /// Out-degree; 0 for unknown nodes.
    pub fn degree(&self, node: NodeId) -> usize {
        self.extents.get(&node).map_or(0, Extent::len)
    }

    /// The neighbor in slot `i` of the node's extent.
    ///
    /// Callers must keep `i < self.degree(node)`; anything else is a logic
    /// error and panics.
    pub fn neighbor_at(&self, node: NodeId, i: usize) -> NodeId {
        let extent = self.extents[&node];
        debug_assert!(i < extent.len(), "slot {} out of range for node {}", i, node);
        self.neighbors[extent.start + i]
    }

    /// Out-neighbors of a node as a slice; empty for unknown nodes.
    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.extents
            .get(&node)
            .map(|e| &self.neighbors[e.start..e.end])
            .unwrap_or(&[])
    }

    /// Nodes that own an extent (possibly empty).
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.extents.keys().copied()
    }

    /// Nodes that own an extent. In a directed build, nodes that are only
    /// ever targets are not counted; see [`Self::endpoint_count`].
    pub fn node_count(&self) -> usize {
        self.extents.len()
    }

    /// Distinct ids appearing anywhere in the index, as source or target.
    pub fn endpoint_count(&self) -> usize {
        let mut seen: HashSet<NodeId> = self.extents.keys().copied().collect();
        seen.extend(self.neighbors.iter().copied());
        seen.len()
    }

    /// Stored directed entries (twice the edge count when undirected).
    pub fn edge_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let array = self.neighbors.capacity() * size_of::<NodeId>();
        // Key + value + rough per-bucket overhead of the hash map.
        let extents = self.extents.capacity() * (size_of::<NodeId>() + size_of::<Extent>() + 8);
        array + extents
    }
}

fn tally(counts: &mut HashMap<NodeId, usize>, order: &mut Vec<NodeId>, node: NodeId) {
    let count = counts.entry(node).or_insert_with(|| {
        order.push(node);
        0
    });
    *count += 1;
}

fn place(
    cursors: &mut HashMap<NodeId, usize>,
    neighbors: &mut [NodeId],
    source: NodeId,
    target: NodeId,
) {
    if let Some(slot) = cursors.get_mut(&source) {
        neighbors[*slot] = target;
        *slot += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> AdjacencyIndex {
        AdjacencyIndex::build(&[(1, 2), (2, 3), (1, 3)], true)
    }

    #[test]
    fn test_triangle_degrees() {
        let g = triangle();
        assert_eq!(g.degree(1), 2);
        assert_eq!(g.degree(2), 1);
        assert_eq!(g.degree(3), 0);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn test_node_and_endpoint_counts() {
        let g = triangle();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.endpoint_count(), 3);

        let undirected = AdjacencyIndex::build(&[(1, 2), (2, 3), (1, 3)], false);
        assert_eq!(undirected.node_count(), 3);
        assert_eq!(undirected.endpoint_count(), 3);
    }

    #[test]
    fn test_unknown_node_degree_zero() {
        let g = triangle();
        assert_eq!(g.degree(999), 0);
        assert!(g.neighbors(999).is_empty());
    }

    #[test]
    fn test_encounter_order_preserved() {
        let g = AdjacencyIndex::build(&[(5, 9), (1, 2), (5, 7), (5, 8)], true);
        assert_eq!(g.neighbors(5), &[9, 7, 8]);
        assert_eq!(g.neighbor_at(5, 1), 7);
        assert_eq!(g.neighbors(1), &[2]);
    }

    #[test]
    fn test_duplicates_kept() {
        let g = AdjacencyIndex::build(&[(1, 2), (1, 2), (1, 2)], true);
        assert_eq!(g.degree(1), 3);
        assert_eq!(g.neighbors(1), &[2, 2, 2]);
    }

    #[test]
    fn test_undirected_stores_reverse_entries() {
        let g = AdjacencyIndex::build(&[(1, 2), (2, 3), (1, 3)], false);
        assert_eq!(g.edge_count(), 6);
        assert_eq!(g.neighbors(1), &[2, 3]);
        // Forward entry first, then reverse entries in edge order.
        assert_eq!(g.neighbors(2), &[3, 1]);
        assert_eq!(g.neighbors(3), &[2, 1]);
        assert!(!g.is_directed());
    }

    #[test]
    fn test_degree_sum_matches_entries() {
        let edges: Vec<EdgePair> = (0..50).map(|i| (i % 7, (i * 3) % 11)).collect();
        for directed in [true, false] {
            let g = AdjacencyIndex::build(&edges, directed);
            let sum: usize = g.nodes().map(|n| g.degree(n)).sum();
            assert_eq!(sum, g.edge_count());
        }
    }

    #[test]
    fn test_extents_disjoint_and_covering() {
        let edges: Vec<EdgePair> = (0..40).map(|i| (i % 5, i)).collect();
        let g = AdjacencyIndex::build(&edges, false);
        let mut extents: Vec<Extent> = g.extents.values().copied().collect();
        extents.sort_by_key(|e| e.start);
        let mut cursor = 0;
        for e in extents {
            assert_eq!(e.start, cursor);
            cursor = e.end;
        }
        assert_eq!(cursor, g.edge_count());
    }

    #[test]
    fn test_empty_extent_same_as_absent() {
        let g = AdjacencyIndex {
            neighbors: vec![2],
            extents: HashMap::from([
                (1, Extent { start: 0, end: 1 }),
                (7, Extent { start: 1, end: 1 }),
            ]),
            directed: true,
        };
        assert_eq!(g.degree(7), 0);
        assert_eq!(g.degree(8), 0);
        assert_eq!(g.neighbors(7), g.neighbors(8));
    }

    #[test]
    fn test_orientation() {
        let follows = [(10, 20), (10, 30)];
        let following = AdjacencyIndex::from_follows(&follows, Orientation::Following, true);
        assert_eq!(following.degree(10), 2);
        assert_eq!(following.degree(20), 0);

        let followers = AdjacencyIndex::from_follows(&follows, Orientation::Followers, true);
        assert_eq!(followers.degree(10), 0);
        assert_eq!(followers.neighbors(20), &[10]);
        assert_eq!(followers.neighbors(30), &[10]);
    }

    #[test]
    fn test_empty_graph() {
        let g = AdjacencyIndex::build(&[], true);
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.endpoint_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.degree(0), 0);
    }

    #[test]
    fn test_snapshot_roundtrip_preserves_queries() {
        let g = triangle();
        let json = serde_json::to_string(&g).unwrap();
        let restored: AdjacencyIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.neighbors(1), g.neighbors(1));
        assert_eq!(restored.degree(3), 0);
        assert!(restored.is_directed());
    }

    #[test]
    fn test_memory_usage_nonzero() {
        assert!(triangle().memory_usage() > 0);
    }
}
