//! On-disk index mapping player keys to cached payload records
//!
//! The index is a single JSON document of the form
//! `{"players": {"Name#Tag": {...entry...}}}`. It is rewritten in full on every
//! update through a temporary file that is renamed over the previous index,
//! so readers only ever see a complete document.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Metadata about one cached player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Account identifier, when the lookup reported one
    pub puuid: Option<String>,
    /// Region the payload was fetched from
    pub region: String,
    /// Path of the payload record this entry describes
    pub storage_location: PathBuf,
    pub fetched_at: DateTime<Utc>,
}

impl IndexEntry {
    /// Whether the entry is younger than `max_age_hours` at `now`
    ///
    /// A zero threshold is never fresh.
    pub fn is_fresh(&self, max_age_hours: u64, now: DateTime<Utc>) -> bool {
        if max_age_hours == 0 {
            return false;
        }
        let age_secs = now.signed_duration_since(self.fetched_at).num_seconds();
        // Entries stamped in the future count as fresh
        match u64::try_from(age_secs) {
            Ok(age) => age < max_age_hours.saturating_mul(3600),
            Err(_) => true,
        }
    }
}

/// Player key to entry mapping, persisted as `index.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheIndex {
    #[serde(default)]
    players: BTreeMap<String, IndexEntry>,
}

impl CacheIndex {
    /// Loads the index from `path`
    ///
    /// A missing file yields an empty index. So does an unreadable or
    /// unparseable one, after logging a warning; the next save replaces it.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No cache index yet, starting empty");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read cache index, starting empty");
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(index) => {
                debug!(entries = index.len(), "Loaded cache index");
                index
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse cache index, starting empty");
                Self::default()
            }
        }
    }

    /// Atomically replaces the index file at `path`
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        write_atomic(path, &json)?;
        debug!(entries = self.len(), path = %path.display(), "Saved cache index");
        Ok(())
    }

    /// Entry for the `Name#Tag` key, if cached
    pub fn get(&self, key: &str) -> Option<&IndexEntry> {
        self.players.get(key)
    }

    /// Adds or replaces the entry for a key
    ///
    /// Only the in-memory index changes; call [`CacheIndex::save`] to persist.
    pub fn insert(&mut self, key: impl Into<String>, entry: IndexEntry) {
        self.players.insert(key.into(), entry);
    }

    /// Drops the entry for a key, returning it if present
    pub fn remove(&mut self, key: &str) -> Option<IndexEntry> {
        self.players.remove(key)
    }

    /// Number of cached players
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether no players are cached
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Path of the staging file used while replacing `path`
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `contents` next to `path`, flushes it to disk, and returns the
/// staging path without touching `path` itself
pub(crate) fn stage(path: &Path, contents: &[u8]) -> io::Result<PathBuf> {
    let temp_path = temp_path_for(path);
    let mut file = File::create(&temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    Ok(temp_path)
}

/// Writes `contents` to `path` through a staging file and rename
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let temp_path = stage(path, contents)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    Ok(())
}
