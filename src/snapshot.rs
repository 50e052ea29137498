//! Whole-engine snapshots as JSON: counters, the running round, every closed
//! round with its outstanding claims, and the treasury.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::RoundCoordinator;
use crate::error::SnapshotError;

/// Bumped whenever the on-disk layout changes incompatibly.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Configuration for engine snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub path: PathBuf,
    pub save_on_exit: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        SnapshotConfig {
            path: PathBuf::from("engine_snapshot.json"),
            save_on_exit: false,
        }
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    engine: &'a RoundCoordinator,
}

#[derive(Deserialize)]
struct SnapshotOwned {
    version: u32,
    engine: RoundCoordinator,
}

/// Write a snapshot. The file is written next to `path` and renamed into
/// place, so readers never observe a partial snapshot.
pub fn save(engine: &RoundCoordinator, path: &Path) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&SnapshotRef {
        version: SNAPSHOT_VERSION,
        engine,
    })?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Restore an engine from a snapshot. Subscribers are not part of a snapshot.
pub fn load(path: &Path) -> Result<RoundCoordinator, SnapshotError> {
    let json = fs::read_to_string(path).map_err(|e| SnapshotError::SnapshotRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let snapshot: SnapshotOwned =
        serde_json::from_str(&json).map_err(|e| SnapshotError::SnapshotParse {
            path: path.to_path_buf(),
            source: e,
        })?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::VersionMismatch {
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    Ok(snapshot.engine)
}
