//! Pixie-style random-walk recommendations.
//!
//! Seeds are weighted by degree, each seed receives a share of a global
//! step budget, and walks from each seed count how often every node is
//! the terminal node. Based on Eksombatchai et al. (2018), "Pixie: A
//! System for Recommending 3+ Billion Items to 200+ Million Users in
//! Real-Time".

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{check_positive, Result};
use crate::graph::{AdjacencyIndex, NodeId};
use crate::rank::{top_n, ScoredNode};
use crate::walk::RandomWalker;

pub const DEFAULT_MAX_WALK_LENGTH: usize = 5;
pub const DEFAULT_STEP_BUDGET: u64 = 1_000_000;

/// Query parameters for [`RecommendationEngine::recommend`].
#[derive(Debug, Clone, Copy)]
pub struct RecommendConfig {
    /// Upper bound on the length of a single walk.
    pub max_walk_length: usize,
    /// Hard cap on the total walk steps across all seeds.
    pub step_budget: u64,
    /// Base seed for the per-seed RNGs. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            max_walk_length: DEFAULT_MAX_WALK_LENGTH,
            step_budget: DEFAULT_STEP_BUDGET,
            seed: None,
        }
    }
}

/// Work performed by one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub walks: u64,
    /// Walks that ended on their own seed and were not counted.
    pub discarded: u64,
    /// Total steps taken; never exceeds the step budget.
    pub steps: u64,
}

impl WalkStats {
    fn merge(self, other: Self) -> Self {
        Self {
            walks: self.walks + other.walks,
            discarded: self.discarded + other.discarded,
            steps: self.steps + other.steps,
        }
    }
}

/// Ranked recommendations plus the work it took to produce them.
#[derive(Debug, Clone, Default)]
pub struct Recommendations {
    pub ranked: Vec<ScoredNode>,
    pub stats: WalkStats,
}

type VisitCounts = HashMap<NodeId, u64>;

pub struct RecommendationEngine<'a> {
    walker: RandomWalker<'a>,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(index: &'a AdjacencyIndex) -> Self {
        Self {
            walker: RandomWalker::new(index),
        }
    }

    /// Probability of starting walks from each seed, from its degree.
    ///
    /// A seed of degree `d` gets `d * (max_degree - ln d)` before
    /// normalization; degree-0 and unknown seeds get 0. If every seed has
    /// degree 0 all weights are 0.
    pub fn input_weights(&self, seeds: &[NodeId]) -> BTreeMap<NodeId, f64> {
        let index = self.walker.index();
        let degrees: BTreeMap<NodeId, usize> =
            seeds.iter().map(|&s| (s, index.degree(s))).collect();

        let total: usize = degrees.values().sum();
        if total == 0 {
            return degrees.keys().map(|&s| (s, 0.0)).collect();
        }

        let max_degree = degrees.values().copied().max().unwrap_or(0) as f64;
        let raw: BTreeMap<NodeId, f64> = degrees
            .iter()
            .map(|(&s, &d)| {
                let weight = if d == 0 {
                    0.0
                } else {
                    let d = d as f64;
                    d * (max_degree - d.ln())
                };
                (s, weight)
            })
            .collect();

        let sum: f64 = raw.values().sum();
        raw.into_iter().map(|(s, w)| (s, w / sum)).collect()
    }

    /// Top `n` nodes by walk-termination frequency across all seeds.
    ///
    /// Seeds never appear in the result. The total number of walk steps
    /// is bounded by `config.step_budget` regardless of graph size.
    pub fn recommend(&self, seeds: &[NodeId], n: usize, config: &RecommendConfig) -> Result<Recommendations> {
        check_positive(config.max_walk_length, "max_walk_length")?;

        let weights = self.input_weights(seeds);
        if weights.values().all(|&w| w == 0.0) {
            debug!(seeds = weights.len(), "no seed has out-edges, nothing to walk");
            return Ok(Recommendations::default());
        }

        // Budgets are allocated in ascending seed order and capped so they
        // never sum past the global budget.
        let mut remaining = config.step_budget;
        let mut allocations = Vec::with_capacity(weights.len());
        for (position, (&seed, &weight)) in weights.iter().enumerate() {
            let share = ((weight * config.step_budget as f64).floor() as u64).min(remaining);
            remaining -= share;
            if share > 0 {
                allocations.push((position as u64, seed, share));
            }
        }

        let base_seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let (mut counts, stats) = allocations
            .par_iter()
            .map(|&(position, seed, budget)| {
                let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(position));
                self.walk_from_seed(seed, budget, config.max_walk_length, &mut rng)
            })
            .reduce(
                || (VisitCounts::new(), WalkStats::default()),
                |(mut acc, acc_stats), (counts, stats)| {
                    for (node, count) in counts {
                        *acc.entry(node).or_insert(0) += count;
                    }
                    (acc, acc_stats.merge(stats))
                },
            );

        for seed in weights.keys() {
            counts.remove(seed);
        }

        debug!(
            seeds = weights.len(),
            walks = stats.walks,
            discarded = stats.discarded,
            steps = stats.steps,
            budget = config.step_budget,
            candidates = counts.len(),
            "recommendation walks finished"
        );

        Ok(Recommendations {
            ranked: rank(counts, n),
            stats,
        })
    }

    /// Recommendations for a single seed, spending the whole budget on it.
    pub fn recommend_for_node(&self, seed: NodeId, n: usize, config: &RecommendConfig) -> Result<Recommendations> {
        check_positive(config.max_walk_length, "max_walk_length")?;

        if self.walker.index().degree(seed) == 0 {
            return Ok(Recommendations::default());
        }

        let mut rng = match config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let (counts, stats) =
            self.walk_from_seed(seed, config.step_budget, config.max_walk_length, &mut rng);

        Ok(Recommendations {
            ranked: rank(counts, n),
            stats,
        })
    }

    /// Walk from `seed` until `budget` steps are spent.
    ///
    /// The last walk is shortened to the remaining budget so the seed
    /// never overshoots. Walks ending on the seed still spend steps but
    /// are not counted.
    fn walk_from_seed(
        &self,
        seed: NodeId,
        budget: u64,
        max_walk_length: usize,
        rng: &mut StdRng,
    ) -> (VisitCounts, WalkStats) {
        let mut counts = VisitCounts::new();
        let mut stats = WalkStats::default();

        while stats.steps < budget {
            let remaining = usize::try_from(budget - stats.steps).unwrap_or(usize::MAX);
            let walk = self
                .walker
                .walk_unchecked(seed, max_walk_length.min(remaining), rng);
            stats.steps += walk.steps as u64;
            stats.walks += 1;

            if walk.destination == seed {
                stats.discarded += 1;
                continue;
            }
            *counts.entry(walk.destination).or_insert(0) += 1;
        }

        (counts, stats)
    }
}

fn rank(counts: VisitCounts, n: usize) -> Vec<ScoredNode> {
    top_n(counts.into_iter().map(|(node, c)| (node, c as f64)), Some(n))
        .into_iter()
        .map(ScoredNode::from)
        .collect()
}

/// Deduplicated seed list in ascending order.
pub fn unique_seeds(seeds: &[NodeId]) -> Vec<NodeId> {
    seeds.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}
