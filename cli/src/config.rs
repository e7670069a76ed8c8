use std::path::PathBuf;

use clap::{Args, ValueEnum};
use neta_core::Orientation;

pub const MIN_MEMORY_MB: i64 = 64;
pub const MAX_MEMORY_MB: i64 = 131_072; // 128 GB

/// Settings shared by every subcommand. Each flag can also be set through
/// its `NETA_*` environment variable.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Follow edge list (CSV with `follower,followed` columns)
    #[arg(long, env = "NETA_EDGES", default_value = "data/edges.csv", global = true)]
    pub edges: PathBuf,

    /// User table (CSV with `id,username` columns) for name lookup
    #[arg(long, env = "NETA_USERS", global = true)]
    pub users: Option<PathBuf>,

    /// Directory for built-index snapshots
    #[arg(long, env = "NETA_CACHE_DIR", default_value = "tmp", global = true)]
    pub cache_dir: PathBuf,

    /// Always rebuild the index instead of using a snapshot
    #[arg(long, env = "NETA_NO_CACHE", global = true)]
    pub no_cache: bool,

    /// Store every follow edge in both directions
    #[arg(long, env = "NETA_UNDIRECTED", global = true)]
    pub undirected: bool,

    /// Walk along follows (`following`) or against them (`followers`)
    #[arg(long, env = "NETA_ORIENTATION", value_enum, default_value_t = OrientationArg::Following, global = true)]
    pub orientation: OrientationArg,

    /// Refuse to keep an index larger than this (MB)
    #[arg(
        long,
        env = "NETA_MAX_MEMORY_MB",
        default_value_t = 4096,
        value_parser = clap::value_parser!(i64).range(MIN_MEMORY_MB..=MAX_MEMORY_MB),
        global = true
    )]
    pub max_memory_mb: i64,

    /// RNG seed for reproducible walks
    #[arg(long, env = "NETA_SEED", global = true)]
    pub seed: Option<u64>,
}

impl Settings {
    /// Settings pointing at an edge file, everything else at its default.
    pub fn for_edges(edges: impl Into<PathBuf>) -> Self {
        Self {
            edges: edges.into(),
            users: None,
            cache_dir: PathBuf::from("tmp"),
            no_cache: false,
            undirected: false,
            orientation: OrientationArg::Following,
            max_memory_mb: 4096,
            seed: None,
        }
    }

    pub fn directed(&self) -> bool {
        !self.undirected
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation.into()
    }

    pub fn max_memory_bytes(&self) -> usize {
        self.max_memory_mb as usize * 1024 * 1024
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrientationArg {
    Following,
    Followers,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Following => Orientation::Following,
            OrientationArg::Followers => Orientation::Followers,
        }
    }
}
