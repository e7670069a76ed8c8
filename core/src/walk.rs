use rand::Rng;

use crate::error::{check_positive, Result};
use crate::graph::{AdjacencyIndex, NodeId};

/// Outcome of a single bounded random walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walk {
    pub destination: NodeId,
    /// Number of steps chained, in `[1, max_length]`.
    pub steps: usize,
}

/// Uniform random walker over an [`AdjacencyIndex`].
///
/// Holds only a shared reference to the index. Dead ends absorb: a step
/// from a node with no out-neighbors (or an unknown node) stays put.
#[derive(Debug, Clone, Copy)]
pub struct RandomWalker<'a> {
    index: &'a AdjacencyIndex,
}

impl<'a> RandomWalker<'a> {
    pub const fn new(index: &'a AdjacencyIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a AdjacencyIndex {
        self.index
    }

    /// One uniformly random out-neighbor, or `node` itself at a dead end.
    pub fn random_step<R: Rng>(&self, node: NodeId, rng: &mut R) -> NodeId {
        match self.index.degree(node) {
            0 => node,
            degree => self.index.neighbor_at(node, rng.random_range(0..degree)),
        }
    }

    /// Walk from `source` for a length drawn once, uniformly from
    /// `[1, max_length]`.
    pub fn walk<R: Rng>(&self, source: NodeId, max_length: usize, rng: &mut R) -> Result<Walk> {
        check_positive(max_length, "max_walk_length")?;
        Ok(self.walk_unchecked(source, max_length, rng))
    }

    pub(crate) fn walk_unchecked<R: Rng>(
        &self,
        source: NodeId,
        max_length: usize,
        rng: &mut R,
    ) -> Walk {
        let steps = rng.random_range(1..=max_length);
        let mut current = source;
        for _ in 0..steps {
            current = self.random_step(current, rng);
        }
        Walk {
            destination: current,
            steps,
        }
    }
}
