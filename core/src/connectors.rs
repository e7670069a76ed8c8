//! Short explanatory paths from a community to a target node.
//!
//! Paths are found by iterative deepening over the exact path length.
//! Each round enumerates every simple path of that length with an
//! explicit-stack depth-first search that never steps through an interior
//! node already used by an accepted path of a shorter length.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::debug;

use crate::error::{check_positive, Result};
use crate::graph::{AdjacencyIndex, NodeId};

pub const DEFAULT_MAX_PATH_LENGTH: usize = 3;

/// Node sequence where consecutive pairs are stored directed edges.
pub type Path = Vec<NodeId>;

pub struct ConnectorPathFinder<'a> {
    index: &'a AdjacencyIndex,
}

impl<'a> ConnectorPathFinder<'a> {
    pub const fn new(index: &'a AdjacencyIndex) -> Self {
        Self { index }
    }

    /// Up to `n` simple paths from any of `sources` to `target`, each at
    /// most `max_path_length` edges long. Paths are simple: no node
    /// repeats, and the target only ever appears last.
    ///
    /// Rounds run for `L = 1..=max_path_length` and stop after the first
    /// round that brings the accepted count to `n`. A candidate of length
    /// `L` is rejected when one of its interior nodes already appeared in
    /// an accepted path of length `< L`; the pruning table is only updated
    /// between rounds. Results are ordered by ascending length, then
    /// lexicographically by node sequence. Unknown sources or targets
    /// simply yield no paths.
    pub fn find_paths(
        &self,
        sources: &[NodeId],
        target: NodeId,
        n: usize,
        max_path_length: usize,
    ) -> Result<Vec<Path>> {
        check_positive(max_path_length, "max_path_length")?;
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut seen_sources = HashSet::new();
        let sources: Vec<NodeId> = sources
            .iter()
            .copied()
            .filter(|s| seen_sources.insert(*s))
            .collect();

        let mut first_used: HashMap<NodeId, usize> = HashMap::new();
        let mut accepted: Vec<Path> = Vec::new();
        let mut accepted_set: HashSet<Path> = HashSet::new();

        for length in 1..=max_path_length {
            // `first_used` is read-only for the whole round.
            let candidates: Vec<Vec<Path>> = sources
                .par_iter()
                .map(|&source| self.paths_of_length(source, target, length, &first_used))
                .collect();

            let mut used_this_round: Vec<NodeId> = Vec::new();
            for candidate in candidates.into_iter().flatten() {
                if accepted_set.contains(&candidate) {
                    continue;
                }
                used_this_round.extend_from_slice(&candidate[1..candidate.len() - 1]);
                accepted_set.insert(candidate.clone());
                accepted.push(candidate);
            }
            for node in used_this_round {
                first_used.entry(node).or_insert(length);
            }

            debug!(length, accepted = accepted.len(), "connector round done");
            if accepted.len() >= n {
                break;
            }
        }

        accepted.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        accepted.truncate(n);
        Ok(accepted)
    }

    /// Every simple path of exactly `length` edges from `source` to
    /// `target`, in neighbor order, whose interior nodes were not first
    /// used at a length below `length`.
    ///
    /// The stack holds one neighbor cursor per node on the current path,
    /// so its depth never exceeds `length`.
    fn paths_of_length(
        &self,
        source: NodeId,
        target: NodeId,
        length: usize,
        first_used: &HashMap<NodeId, usize>,
    ) -> Vec<Path> {
        let mut found = Vec::new();
        if source == target {
            return found;
        }

        let mut path: Vec<NodeId> = vec![source];
        let mut cursors: Vec<usize> = vec![0];

        while let Some(cursor) = cursors.last_mut() {
            let depth = path.len() - 1;
            let node = path[depth];
            let neighbors = self.index.neighbors(node);

            if *cursor >= neighbors.len() {
                path.pop();
                cursors.pop();
                continue;
            }
            let next = neighbors[*cursor];
            *cursor += 1;

            if depth + 1 == length {
                if next == target {
                    let mut complete = path.clone();
                    complete.push(next);
                    found.push(complete);
                }
                continue;
            }

            // The target only ever ends a path, and paths never revisit.
            if next == target || path.contains(&next) {
                continue;
            }
            if first_used.get(&next).is_some_and(|&used| used < length) {
                continue;
            }
            path.push(next);
            cursors.push(0);
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn triangle() -> AdjacencyIndex {
        AdjacencyIndex::build(&[(1, 2), (2, 3), (1, 3)], true)
    }

    fn is_valid(g: &AdjacencyIndex, path: &[NodeId]) -> bool {
        path.windows(2).all(|w| g.neighbors(w[0]).contains(&w[1]))
    }

    #[test]
    fn test_triangle_scenario() {
        let g = triangle();
        let finder = ConnectorPathFinder::new(&g);
        let paths = finder.find_paths(&[1], 3, 2, 2).unwrap();
        assert_eq!(paths, vec![vec![1, 3], vec![1, 2, 3]]);
    }

    #[test]
    fn test_stops_once_n_reached() {
        let g = triangle();
        let finder = ConnectorPathFinder::new(&g);
        let paths = finder.find_paths(&[1], 3, 1, 3).unwrap();
        assert_eq!(paths, vec![vec![1, 3]]);
    }

    #[test]
    fn test_prunes_longer_detours_through_used_nodes() {
        // 1->2->9 is accepted at length 2, so 1->3->2->9 is rejected at
        // length 3, while 1->4->5->9 is kept.
        let g = AdjacencyIndex::build(
            &[(1, 2), (2, 9), (1, 3), (3, 2), (1, 4), (4, 5), (5, 9)],
            true,
        );
        let finder = ConnectorPathFinder::new(&g);
        let paths = finder.find_paths(&[1], 9, 10, 3).unwrap();
        assert_eq!(paths, vec![vec![1, 2, 9], vec![1, 4, 5, 9]]);
    }

    #[test]
    fn test_search_skips_nodes_used_at_shorter_length() {
        // 1->2->9 is accepted at length 2. Hub 2 also fans out to 200
        // nodes that each reach 9, none of which may be enumerated at
        // length 3.
        let mut edges = vec![(1, 2), (2, 9)];
        for m in 100..300u64 {
            edges.push((2, m));
            edges.push((m, 9));
        }
        let g = AdjacencyIndex::build(&edges, true);
        let finder = ConnectorPathFinder::new(&g);

        let unpruned = finder.paths_of_length(1, 9, 3, &HashMap::new());
        assert_eq!(unpruned.len(), 200);

        let first_used = HashMap::from([(2, 2)]);
        let pruned = finder.paths_of_length(1, 9, 3, &first_used);
        assert!(pruned.iter().all(|p| !p[1..p.len() - 1].contains(&2)));
        assert!(pruned.is_empty());

        // Same length does not prune.
        let same_round = HashMap::from([(2, 3)]);
        assert_eq!(finder.paths_of_length(1, 9, 3, &same_round).len(), 200);

        assert_eq!(finder.find_paths(&[1], 9, 10, 3).unwrap(), vec![vec![1, 2, 9]]);
    }

    #[test]
    fn test_same_round_does_not_prune() {
        // Both length-2 paths through 2 come from different sources in the
        // same round and are both kept.
        let g = AdjacencyIndex::build(&[(1, 2), (5, 2), (2, 9)], true);
        let finder = ConnectorPathFinder::new(&g);
        let paths = finder.find_paths(&[5, 1], 9, 10, 3).unwrap();
        assert_eq!(paths, vec![vec![1, 2, 9], vec![5, 2, 9]]);
    }

    #[test]
    fn test_multiple_sources_lexicographic_order() {
        let g = AdjacencyIndex::build(&[(7, 9), (3, 9), (5, 9)], true);
        let finder = ConnectorPathFinder::new(&g);
        let paths = finder.find_paths(&[7, 5, 3], 9, 2, 3).unwrap();
        assert_eq!(paths, vec![vec![3, 9], vec![5, 9]]);
    }

    #[test]
    fn test_unknown_source_or_target() {
        let g = triangle();
        let finder = ConnectorPathFinder::new(&g);
        assert!(finder.find_paths(&[404], 3, 5, 3).unwrap().is_empty());
        assert!(finder.find_paths(&[1], 404, 5, 3).unwrap().is_empty());
        assert!(finder.find_paths(&[], 3, 5, 3).unwrap().is_empty());
    }

    #[test]
    fn test_source_equals_target() {
        let g = AdjacencyIndex::build(&[(1, 2), (2, 1)], true);
        let finder = ConnectorPathFinder::new(&g);
        assert!(finder.find_paths(&[1], 1, 5, 3).unwrap().is_empty());
    }

    #[test]
    fn test_paths_are_simple() {
        // Cycle 1->2->1 must not produce 1->2->1->3.
        let g = AdjacencyIndex::build(&[(1, 2), (2, 1), (1, 3)], true);
        let finder = ConnectorPathFinder::new(&g);
        let paths = finder.find_paths(&[1], 3, 10, 3).unwrap();
        assert_eq!(paths, vec![vec![1, 3]]);
    }

    #[test]
    fn test_duplicate_edges_yield_one_path() {
        let g = AdjacencyIndex::build(&[(1, 3), (1, 3)], true);
        let finder = ConnectorPathFinder::new(&g);
        assert_eq!(finder.find_paths(&[1, 1], 3, 5, 2).unwrap(), vec![vec![1, 3]]);
    }

    #[test]
    fn test_respects_max_length() {
        let edges: Vec<(u64, u64)> = (0..6).map(|i| (i, i + 1)).collect();
        let g = AdjacencyIndex::build(&edges, true);
        let finder = ConnectorPathFinder::new(&g);
        assert!(finder.find_paths(&[0], 6, 5, 3).unwrap().is_empty());
        let paths = finder.find_paths(&[3], 6, 5, 3).unwrap();
        assert_eq!(paths, vec![vec![3, 4, 5, 6]]);
    }

    #[test]
    fn test_paths_follow_edges() {
        let mut edges = Vec::new();
        for a in 0..6u64 {
            for b in 0..6u64 {
                if a != b && (a + b) % 3 != 0 {
                    edges.push((a, b));
                }
            }
        }
        let g = AdjacencyIndex::build(&edges, true);
        let finder = ConnectorPathFinder::new(&g);
        let paths = finder.find_paths(&[0, 1], 5, 20, 3).unwrap();
        assert!(!paths.is_empty());
        for p in &paths {
            assert!(p[0] == 0 || p[0] == 1);
            assert_eq!(*p.last().unwrap(), 5);
            assert!(p.len() - 1 <= 3);
            assert!(is_valid(&g, p));
        }
    }

    #[test]
    fn test_zero_length_rejected() {
        let g = triangle();
        let finder = ConnectorPathFinder::new(&g);
        let err = finder.find_paths(&[1], 3, 5, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { name: "max_path_length", .. }));
    }

    #[test]
    fn test_n_zero_is_empty() {
        let g = triangle();
        let finder = ConnectorPathFinder::new(&g);
        assert!(finder.find_paths(&[1], 3, 0, 3).unwrap().is_empty());
    }

    #[test]
    fn test_undirected_paths() {
        let g = AdjacencyIndex::build(&[(1, 2), (3, 2)], false);
        let finder = ConnectorPathFinder::new(&g);
        assert_eq!(finder.find_paths(&[1], 3, 5, 2).unwrap(), vec![vec![1, 2, 3]]);
    }
}
