//! Refreshing player cache
//!
//! Provides a `PlayerCache` that serves player payloads from JSON records in a
//! cache directory and refetches them through a [`StatsApi`] once they age out.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::index::{write_atomic, CacheIndex, IndexEntry};
use super::key::{encode_stem, PlayerKey};
use super::{CacheError, CacheResult, PlayerPayload};
use crate::api::{ApiError, StatsApi, DEFAULT_MODE, DEFAULT_PLATFORM};

/// File name of the index inside the cache directory
pub const INDEX_FILE: &str = "index.json";

/// Number of matches requested per history page
pub const MATCH_PAGE_SIZE: usize = 10;

/// Freshness and size limits for a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOptions {
    /// Entries at least this old are refetched
    pub max_age_hours: u64,
    /// Stop paging once this many matches are collected
    ///
    /// The last page is kept whole, so the result may exceed this by up to
    /// one page.
    pub max_matches: usize,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            max_age_hours: 24,
            max_matches: 50,
        }
    }
}

/// Serves player payloads from disk, refreshing them from the API when stale
///
/// Records live in `cache_dir` as `<puuid>.json` (or the encoded player key
/// when no puuid is known), alongside an `index.json` that maps each player
/// key to its record.
#[derive(Debug)]
pub struct PlayerCache<A> {
    api: A,
    cache_dir: PathBuf,
    index: CacheIndex,
    default_region: String,
}

impl<A: StatsApi> PlayerCache<A> {
    /// Opens the cache in `cache_dir`, creating the directory if needed
    pub fn open(
        api: A,
        cache_dir: impl Into<PathBuf>,
        default_region: impl Into<String>,
    ) -> CacheResult<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir)?;
        let index = CacheIndex::load(&cache_dir.join(INDEX_FILE));

        Ok(Self {
            api,
            cache_dir,
            index,
            default_region: default_region.into(),
        })
    }

    /// Returns a payload for `player_key` no older than `options.max_age_hours`
    ///
    /// Fresh entries are read from disk without touching the API. Stale or
    /// absent entries are refetched and persisted. An entry whose record is
    /// missing, corrupt or owned by another player is evicted and refetched
    /// once.
    ///
    /// A fresh hit is decoded into [`PlayerPayload`]. Records written by this
    /// cache re-encode to the same bytes; fields outside the payload schema
    /// are dropped, and a record that does not fit the schema counts as
    /// corrupt.
    pub fn get_or_refresh(
        &mut self,
        player_key: &str,
        options: RefreshOptions,
    ) -> CacheResult<PlayerPayload> {
        let key = PlayerKey::parse(player_key)?;
        let index_key = key.to_string();
        let now = Utc::now();

        let fresh_location = self
            .index
            .get(&index_key)
            .filter(|entry| entry.is_fresh(options.max_age_hours, now))
            .map(|entry| entry.storage_location.clone());

        if let Some(location) = fresh_location {
            match read_payload(&location, &index_key) {
                Ok(payload) => {
                    debug!(player = %index_key, "Cache hit");
                    return Ok(payload);
                }
                Err(err) => {
                    warn!(player = %index_key, error = %err, "Evicting corrupt cache entry");
                    self.index.remove(&index_key);
                    self.save_index()?;
                }
            }
        } else {
            debug!(player = %index_key, "Cache miss or stale entry");
        }

        self.refresh(&key, options.max_matches)
    }

    /// Current in-memory index
    pub fn index(&self) -> &CacheIndex {
        &self.index
    }

    /// Directory holding records and the index
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// The API client backing this cache
    pub fn api(&self) -> &A {
        &self.api
    }

    fn index_path(&self) -> PathBuf {
        self.cache_dir.join(INDEX_FILE)
    }

    fn save_index(&self) -> CacheResult<()> {
        self.index.save(&self.index_path())?;
        Ok(())
    }

    /// Fetches everything for `key` from the API and persists it
    fn refresh(&mut self, key: &PlayerKey, max_matches: usize) -> CacheResult<PlayerPayload> {
        let name_tag = key.to_string();
        let now = Utc::now();

        let account = match self.api.resolve_tag(key.name(), key.tag()) {
            Ok(response) if response.is_success() => response.data,
            Ok(_) | Err(ApiError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        }
        .ok_or_else(|| CacheError::AccountNotFound(name_tag.clone()))?;

        let puuid = account.puuid;
        let region = account
            .region
            .unwrap_or_else(|| self.default_region.clone());

        let matches = self.collect_matches(&region, key, max_matches)?;

        let mmr = match self.api.mmr(&region, key.name(), key.tag(), DEFAULT_PLATFORM) {
            Ok(response) => response.data,
            Err(e) => {
                warn!(player = %name_tag, error = %e, "MMR unavailable, caching without it");
                None
            }
        };

        let payload = PlayerPayload {
            name_tag: name_tag.clone(),
            region: region.clone(),
            puuid: puuid.clone(),
            mmr,
            matches,
            fetched_at: now,
        };

        let stem = puuid
            .as_deref()
            .map(encode_stem)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| key.file_stem());
        let storage_location = self.cache_dir.join(format!("{}.json", stem));
        write_atomic(&storage_location, &serde_json::to_vec(&payload)?)?;

        self.index.insert(
            name_tag.clone(),
            IndexEntry {
                puuid,
                region,
                storage_location,
                fetched_at: now,
            },
        );
        self.save_index()?;

        info!(
            player = %name_tag,
            matches = payload.matches.len(),
            has_mmr = payload.mmr.is_some(),
            "Refreshed player"
        );
        Ok(payload)
    }

    /// Pages through match history until `max_matches` or the end of history
    fn collect_matches(
        &mut self,
        region: &str,
        key: &PlayerKey,
        max_matches: usize,
    ) -> CacheResult<Vec<serde_json::Value>> {
        let mut matches = Vec::new();
        let mut start = 0;

        while matches.len() < max_matches {
            let page = self
                .api
                .matches(region, key.name(), key.tag(), DEFAULT_MODE, MATCH_PAGE_SIZE, start)?
                .data
                .unwrap_or_default();
            debug!(start, received = page.len(), "Fetched match page");
            if page.is_empty() {
                break;
            }
            matches.extend(page);
            start += MATCH_PAGE_SIZE;
        }

        Ok(matches)
    }
}

/// Reads and decodes the payload record for `name_tag`
fn read_payload(path: &Path, name_tag: &str) -> CacheResult<PlayerPayload> {
    let corrupt = |reason: String| CacheError::CorruptCache {
        path: path.to_path_buf(),
        reason,
    };
    let content = fs::read_to_string(path).map_err(|e| corrupt(e.to_string()))?;
    let payload: PlayerPayload =
        serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()))?;
    if payload.name_tag != name_tag {
        return Err(corrupt(format!("record belongs to '{}'", payload.name_tag)));
    }
    Ok(payload)
}
