//! On-disk snapshots of a built index.
//!
//! A snapshot is keyed by orientation and directedness, and stamped with
//! the length and modification time of the edge file it was built from.
//! The stamp plays the role of a generation counter: a snapshot whose
//! stamp no longer matches the edge file is stale and gets rebuilt.
//!
//! Snapshot failures never fail a query. Unreadable or corrupt snapshots
//! are logged and ignored; failed writes are logged and skipped.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use neta_core::{AdjacencyIndex, Orientation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Identity of an edge file at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStamp {
    pub len: u64,
    pub modified_secs: u64,
    pub modified_nanos: u32,
}

impl SourceStamp {
    pub fn of(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path)
            .with_context(|| format!("cannot stat edge file {}", path.display()))?;
        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .unwrap_or_default();
        Ok(Self {
            len: meta.len(),
            modified_secs: modified.as_secs(),
            modified_nanos: modified.subsec_nanos(),
        })
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    stamp: SourceStamp,
    orientation: Orientation,
    directed: bool,
    index: &'a AdjacencyIndex,
}

#[derive(Deserialize)]
struct Snapshot {
    stamp: SourceStamp,
    orientation: Orientation,
    directed: bool,
    index: AdjacencyIndex,
}

pub struct SnapshotCache {
    dir: PathBuf,
}

impl SnapshotCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, orientation: Orientation, directed: bool) -> PathBuf {
        let kind = if directed { "directed" } else { "undirected" };
        self.dir
            .join(format!("network_{}_{}.json", orientation.as_str(), kind))
    }

    /// The cached index, if one exists and was built from `stamp`.
    pub fn load(&self, orientation: Orientation, directed: bool, stamp: &SourceStamp) -> Option<AdjacencyIndex> {
        let path = self.path_for(orientation, directed);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(_) => {
                debug!(path = %path.display(), "no snapshot");
                return None;
            }
        };

        let snapshot: Snapshot = match serde_json::from_reader(BufReader::new(file)) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "loading snapshot failed, rebuilding");
                return None;
            }
        };

        if snapshot.orientation != orientation || snapshot.directed != directed {
            warn!(path = %path.display(), "snapshot key mismatch, rebuilding");
            return None;
        }
        if snapshot.stamp != *stamp {
            info!(
                path = %path.display(),
                cached_len = snapshot.stamp.len,
                current_len = stamp.len,
                "snapshot stale, rebuilding"
            );
            return None;
        }
        if snapshot.index.is_directed() != directed {
            warn!(path = %path.display(), "snapshot index directedness mismatch, rebuilding");
            return None;
        }

        info!(path = %path.display(), "loaded network from snapshot");
        Some(snapshot.index)
    }

    pub fn store(
        &self,
        orientation: Orientation,
        directed: bool,
        stamp: &SourceStamp,
        index: &AdjacencyIndex,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("cannot create cache dir {}", self.dir.display()))?;
        let path = self.path_for(orientation, directed);
        // Write to a sibling file first so a crash never leaves a torn snapshot.
        let tmp = path.with_extension("json.tmp");
        let file = File::create(&tmp)
            .with_context(|| format!("cannot create snapshot {}", tmp.display()))?;
        serde_json::to_writer(
            BufWriter::new(file),
            &SnapshotRef {
                stamp: *stamp,
                orientation,
                directed,
                index,
            },
        )
        .with_context(|| format!("cannot write snapshot {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("cannot move snapshot into {}", path.display()))?;
        Ok(path)
    }

    /// Remove every snapshot in the cache directory. Returns how many
    /// files were deleted.
    pub fn clear(&self) -> Result<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("cannot read cache dir {}", self.dir.display()))
            }
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            let is_snapshot = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("network_") && n.ends_with(".json"));
            if is_snapshot {
                fs::remove_file(&path)
                    .with_context(|| format!("cannot remove {}", path.display()))?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn stamp(len: u64) -> SourceStamp {
        SourceStamp {
            len,
            modified_secs: 1_700_000_000,
            modified_nanos: 0,
        }
    }

    fn triangle() -> AdjacencyIndex {
        AdjacencyIndex::build(&[(1, 2), (2, 3), (1, 3)], true)
    }

    #[test]
    fn test_store_then_load() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path());
        cache
            .store(Orientation::Following, true, &stamp(10), &triangle())
            .unwrap();

        let index = cache.load(Orientation::Following, true, &stamp(10)).unwrap();
        assert_eq!(index.neighbors(1), &[2, 3]);
    }

    #[test]
    fn test_stale_stamp_ignored() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path());
        cache
            .store(Orientation::Following, true, &stamp(10), &triangle())
            .unwrap();
        assert!(cache.load(Orientation::Following, true, &stamp(11)).is_none());
    }

    #[test]
    fn test_keyed_by_orientation_and_direction() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path());
        cache
            .store(Orientation::Following, true, &stamp(10), &triangle())
            .unwrap();
        assert!(cache.load(Orientation::Followers, true, &stamp(10)).is_none());
        assert!(cache.load(Orientation::Following, false, &stamp(10)).is_none());
        assert_ne!(
            cache.path_for(Orientation::Following, true),
            cache.path_for(Orientation::Following, false)
        );
    }

    #[test]
    fn test_corrupt_snapshot_ignored() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path());
        fs::write(cache.path_for(Orientation::Following, true), b"{not json").unwrap();
        assert!(cache.load(Orientation::Following, true, &stamp(10)).is_none());
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path());
        cache
            .store(Orientation::Following, true, &stamp(1), &triangle())
            .unwrap();
        cache
            .store(Orientation::Followers, false, &stamp(1), &triangle())
            .unwrap();
        fs::write(dir.path().join("keep.txt"), b"x").unwrap();

        assert_eq!(cache.clear().unwrap(), 2);
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn test_clear_missing_dir() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path().join("absent"));
        assert_eq!(cache.clear().unwrap(), 0);
    }

    #[test]
    fn test_source_stamp_tracks_length() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("edges.csv");
        fs::write(&path, b"follower,followed\n1,2\n").unwrap();
        let first = SourceStamp::of(&path).unwrap();
        fs::write(&path, b"follower,followed\n1,2\n2,3\n").unwrap();
        let second = SourceStamp::of(&path).unwrap();
        assert_ne!(first.len, second.len);
    }
}
