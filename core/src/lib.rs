//! neta-core: random-walk recommendation engine for follower graphs.
//!
//! A pure Rust library that builds a compact out-neighbor index from a
//! follow edge list and answers two kinds of queries against it:
//! Pixie-style recommendations for a seed community under a hard step
//! budget, and short connector paths from a community to a target
//! account. No I/O — ingestion, caching and username lookup live in the
//! `neta` CLI crate.

mod analysis;
mod connectors;
mod error;
mod graph;
mod rank;
mod recommend;
mod walk;

pub use analysis::{community_alignment, degree_centrality, jaccard_index, AlignmentMode, DegreeResult};
pub use connectors::{ConnectorPathFinder, Path, DEFAULT_MAX_PATH_LENGTH};
pub use error::{Error, Result};
pub use graph::{AdjacencyIndex, EdgePair, Extent, NodeId, Orientation};
pub use rank::{top_n, ScoredNode};
pub use recommend::{
    unique_seeds, RecommendConfig, RecommendationEngine, Recommendations, WalkStats,
    DEFAULT_MAX_WALK_LENGTH, DEFAULT_STEP_BUDGET,
};
pub use walk::{RandomWalker, Walk};
