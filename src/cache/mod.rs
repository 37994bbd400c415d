//! Cache module for storing player data on disk
//!
//! This module provides a refreshing cache that keeps one JSON record per
//! player plus an index mapping `Name#Tag` keys to those records. Entries older
//! than a caller-supplied age are refetched through the rate-limited API
//! client; entries whose record has gone missing or corrupt are evicted and
//! refetched transparently.

mod index;
mod key;
mod manager;

pub use index::{CacheIndex, IndexEntry};
pub use key::PlayerKey;
pub use manager::{PlayerCache, RefreshOptions, INDEX_FILE, MATCH_PAGE_SIZE};

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur while serving a player from the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// The player key is not of the form `Name#Tag`
    #[error("Player key must look like 'Name#Tag', got: '{0}'")]
    InvalidKey(String),

    /// The upstream service has no account for this key
    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    /// A request to the upstream service failed
    #[error("Upstream request failed: {0}")]
    Transport(#[from] ApiError),

    /// A payload record is missing, unreadable or belongs to another player
    ///
    /// Recovered internally by evicting the entry and refetching; never
    /// returned from [`PlayerCache::get_or_refresh`].
    #[error("Cached record {path} is unusable: {reason}")]
    CorruptCache { path: PathBuf, reason: String },

    /// Reading or writing the cache directory failed
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A payload could not be encoded
    #[error("Failed to encode payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Everything fetched for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPayload {
    pub name_tag: String,
    pub region: String,
    pub puuid: Option<String>,
    /// Rank snapshot, `None` when the MMR lookup failed or returned nothing
    pub mmr: Option<Value>,
    /// Match records, newest first
    pub matches: Vec<Value>,
    pub fetched_at: DateTime<Utc>,
}
