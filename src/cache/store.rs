// Snapshot store for the repository list.
// Best-effort persistence: reads degrade to "no snapshot", writes are logged and dropped.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::github::RepoSummary;
use crate::github::types::null_as_default;

/// A persisted copy of the repository list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Capture time in epoch milliseconds. Missing or null means "a long time ago".
    #[serde(default, deserialize_with = "null_as_default")]
    pub ts: i64,
    pub repos: Vec<RepoSummary>,
}

impl CacheSnapshot {
    /// Create a snapshot captured now.
    pub fn new(repos: Vec<RepoSummary>) -> Self {
        Self {
            ts: Utc::now().timestamp_millis(),
            repos,
        }
    }

    /// When the snapshot was taken.
    pub fn captured_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.ts).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Time since capture; zero if the clock went backwards.
    pub fn age(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.captured_at())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Check if the snapshot is older than `ttl`. Expired snapshots are still usable as fallback.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}

/// Owner of the single snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `path`, or at the platform cache location.
    pub fn at(path: Option<&Path>) -> Option<Self> {
        match path {
            Some(path) => Some(Self::new(path)),
            None => super::paths::snapshot_path().map(Self::new),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot. Missing, unreadable or malformed files all yield `None`.
    pub fn load(&self) -> Option<CacheSnapshot> {
        match self.read() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::debug!("Ignoring unreadable snapshot {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Persist `repos` with the current time. Failures are logged and swallowed.
    pub fn save(&self, repos: &[RepoSummary]) {
        let snapshot = CacheSnapshot::new(repos.to_vec());
        if let Err(e) = self.write(&snapshot) {
            tracing::warn!("Could not save snapshot to {}: {}", self.path.display(), e);
        }
    }

    /// Delete the snapshot. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn read(&self) -> Result<Option<CacheSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        let snapshot: CacheSnapshot = serde_json::from_str(&contents)?;
        Ok(Some(snapshot))
    }

    fn write(&self, snapshot: &CacheSnapshot) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(snapshot)?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}
