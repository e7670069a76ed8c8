//! neta - follower-graph recommendations and connector paths.
//!
//! # Usage
//!
//! ```bash
//! # Index stats (builds and caches the index on first run)
//! neta --edges data/edges.csv stats
//!
//! # Accounts related to a seed community
//! neta --users data/users.csv recommend givingwhatwecan 88534421 -n 25
//!
//! # How a community reaches a target account
//! neta --users data/users.csv connectors elonmusk --from givingwhatwecan -n 5
//!
//! # Jaccard alignment with a community's follows
//! neta align givingwhatwecan 363005534 --mode per-member
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use neta_cli::cache::SnapshotCache;
use neta_cli::commands::{self, DEFAULT_CONNECTORS, DEFAULT_RECOMMENDATIONS};
use neta_cli::config::Settings;
use neta_cli::load::{load_graph, LoadedGraph};
use neta_cli::logging::init_logging;
use neta_cli::users::UserDirectory;
use neta_core::{AlignmentMode, RecommendConfig, DEFAULT_MAX_PATH_LENGTH, DEFAULT_MAX_WALK_LENGTH, DEFAULT_STEP_BUDGET};
use tracing::info;

#[derive(Parser)]
#[command(name = "neta")]
#[command(about = "Follower-graph recommendations and connector paths", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show index size, directedness and load time
    Stats,

    /// Rank accounts by out-degree
    Degree {
        /// Number of accounts to show (0 = all)
        #[arg(short, long, default_value = "25")]
        top: usize,
    },

    /// Sample bounded random walks from an account
    Walk {
        /// Username or account id
        node: String,

        /// Maximum steps per walk
        #[arg(long, default_value_t = DEFAULT_MAX_WALK_LENGTH)]
        max_length: usize,

        /// Number of walks
        #[arg(long, default_value = "10")]
        count: usize,
    },

    /// Recommend accounts related to a seed community
    Recommend {
        /// Seed usernames or account ids
        #[arg(required = true)]
        seeds: Vec<String>,

        /// Number of recommendations
        #[arg(short, default_value_t = DEFAULT_RECOMMENDATIONS)]
        n: usize,

        /// Maximum steps per walk
        #[arg(long, default_value_t = DEFAULT_MAX_WALK_LENGTH)]
        max_walk_length: usize,

        /// Total walk steps across all seeds
        #[arg(long, default_value_t = DEFAULT_STEP_BUDGET)]
        budget: u64,
    },

    /// Find short paths from a community to a target account
    Connectors {
        /// Target username or account id
        target: String,

        /// Source usernames or account ids
        #[arg(long = "from", required = true, num_args = 1..)]
        sources: Vec<String>,

        /// Number of paths
        #[arg(short, default_value_t = DEFAULT_CONNECTORS)]
        n: usize,

        /// Maximum edges per path
        #[arg(long, default_value_t = DEFAULT_MAX_PATH_LENGTH)]
        max_path_length: usize,
    },

    /// Rank accounts by Jaccard similarity with a community's follows
    Align {
        /// Community usernames or account ids
        #[arg(required = true)]
        members: Vec<String>,

        /// Compare against the union of follows or each member separately
        #[arg(long, value_enum, default_value = "combined")]
        mode: ModeArg,

        /// Number of accounts to show
        #[arg(short, default_value_t = DEFAULT_RECOMMENDATIONS)]
        n: usize,
    },

    /// Manage index snapshots
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Delete every snapshot in the cache directory
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Combined,
    PerMember,
}

impl From<ModeArg> for AlignmentMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Combined => AlignmentMode::Combined,
            ModeArg::PerMember => AlignmentMode::PerMember,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = cli.settings;

    let output = match cli.command {
        Commands::Cache {
            action: CacheAction::Clear,
        } => {
            let removed = SnapshotCache::new(&settings.cache_dir).clear()?;
            format!("removed {} snapshot(s) from {}\n", removed, settings.cache_dir.display())
        }
        Commands::Stats => {
            let (graph, _) = load_all(&settings)?;
            commands::stats(&graph)
        }
        Commands::Degree { top } => {
            let (graph, users) = load_all(&settings)?;
            commands::degree(&graph, &users, top)
        }
        Commands::Walk {
            node,
            max_length,
            count,
        } => {
            let (graph, users) = load_all(&settings)?;
            let source = users.resolve(&node)?;
            commands::walk(&graph, &users, source, max_length, count, settings.seed)?
        }
        Commands::Recommend {
            seeds,
            n,
            max_walk_length,
            budget,
        } => {
            let (graph, users) = load_all(&settings)?;
            let seeds = users.resolve_all(&seeds)?;
            let config = RecommendConfig {
                max_walk_length,
                step_budget: budget,
                seed: settings.seed,
            };
            commands::recommend(&graph, &users, &seeds, n, &config)?
        }
        Commands::Connectors {
            target,
            sources,
            n,
            max_path_length,
        } => {
            let (graph, users) = load_all(&settings)?;
            let target = users.resolve(&target)?;
            let sources = users.resolve_all(&sources)?;
            commands::connectors(&graph, &users, &sources, target, n, max_path_length)?
        }
        Commands::Align { members, mode, n } => {
            let (graph, users) = load_all(&settings)?;
            let members = users.resolve_all(&members)?;
            commands::align(&graph, &users, &members, mode.into(), n)
        }
    };

    print!("{}", output);
    Ok(())
}

fn load_all(settings: &Settings) -> Result<(LoadedGraph, UserDirectory)> {
    let graph = load_graph(settings)?;
    let users = match &settings.users {
        Some(path) => UserDirectory::read_file(path)?,
        None => UserDirectory::default(),
    };
    if !users.is_empty() {
        info!(users = users.len(), "user directory loaded");
    }
    Ok((graph, users))
}
