use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use neta_core::{AdjacencyIndex, EdgePair};
use tracing::{info, warn};

use crate::cache::{SnapshotCache, SourceStamp};
use crate::config::Settings;

pub const FOLLOWER_COLUMN: &str = "follower";
pub const FOLLOWED_COLUMN: &str = "followed";

/// A built index plus how it was obtained.
pub struct LoadedGraph {
    pub index: AdjacencyIndex,
    pub source: PathBuf,
    pub load_time_ms: f64,
    pub from_cache: bool,
}

/// Follow records read from an edge CSV.
#[derive(Debug, Default)]
pub struct FollowList {
    pub follows: Vec<EdgePair>,
    /// Rows dropped because an id column was missing or not an integer.
    pub skipped: usize,
}

/// Read `(follower, followed)` pairs from a headered CSV. Extra columns
/// are ignored; column order does not matter.
pub fn read_follows<R: Read>(reader: R) -> Result<FollowList> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().context("cannot read edge CSV header")?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let (Some(follower_col), Some(followed_col)) = (column(FOLLOWER_COLUMN), column(FOLLOWED_COLUMN)) else {
        bail!(
            "edge CSV must have `{}` and `{}` columns, found: {}",
            FOLLOWER_COLUMN,
            FOLLOWED_COLUMN,
            headers.iter().collect::<Vec<_>>().join(",")
        );
    };

    let mut list = FollowList::default();
    for record in reader.records() {
        let record = record.context("malformed edge CSV row")?;
        let parse = |col: usize| record.get(col).and_then(|v| v.parse::<u64>().ok());
        match (parse(follower_col), parse(followed_col)) {
            (Some(follower), Some(followed)) => list.follows.push((follower, followed)),
            _ => list.skipped += 1,
        }
    }

    if list.skipped > 0 {
        warn!(skipped = list.skipped, "edge rows with unparsable ids were skipped");
    }
    Ok(list)
}

pub fn read_follows_file(path: &Path) -> Result<FollowList> {
    let file = File::open(path).with_context(|| format!("cannot open edge file {}", path.display()))?;
    read_follows(file).with_context(|| format!("cannot read edge file {}", path.display()))
}

/// Load the index for `settings`, from a fresh snapshot when one exists,
/// otherwise by reading the edge CSV and building it (and refreshing the
/// snapshot).
pub fn load_graph(settings: &Settings) -> Result<LoadedGraph> {
    let start = Instant::now();
    let orientation = settings.orientation();
    let directed = settings.directed();
    let cache = SnapshotCache::new(&settings.cache_dir);

    let stamp = SourceStamp::of(&settings.edges)?;
    let cached = if settings.no_cache {
        None
    } else {
        cache.load(orientation, directed, &stamp)
    };
    let from_cache = cached.is_some();

    let index = match cached {
        Some(index) => index,
        None => {
            let list = read_follows_file(&settings.edges)?;
            let index = AdjacencyIndex::from_follows(&list.follows, orientation, directed);
            if !settings.no_cache {
                match cache.store(orientation, directed, &stamp, &index) {
                    Ok(path) => info!(path = %path.display(), "saved network snapshot"),
                    Err(e) => warn!(error = %format!("{:#}", e), "saving network snapshot failed"),
                }
            }
            index
        }
    };

    check_memory(&index, settings)?;

    let load_time_ms = start.elapsed().as_secs_f64() * 1000.0;
    info!(
        accounts = index.endpoint_count(),
        sources = index.node_count(),
        entries = index.edge_count(),
        directed,
        orientation = orientation.as_str(),
        from_cache,
        load_time_ms,
        "network ready"
    );

    Ok(LoadedGraph {
        index,
        source: settings.edges.clone(),
        load_time_ms,
        from_cache,
    })
}

fn check_memory(index: &AdjacencyIndex, settings: &Settings) -> Result<()> {
    let used = index.memory_usage();
    if used > settings.max_memory_bytes() {
        bail!(
            "loaded network uses {}MB, exceeds max_memory_mb={}MB",
            used / (1024 * 1024),
            settings.max_memory_mb
        );
    }
    Ok(())
}
