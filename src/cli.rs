//! Command-line interface parsing for valocache
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the refresh options and configuration overrides used at startup.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::cache::{CacheError, PlayerKey, PlayerPayload, RefreshOptions};
use crate::config::Config;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The player argument is not a valid `Name#Tag`
    #[error("{0}")]
    InvalidPlayer(#[from] CacheError),
}

/// valocache - Fetch and cache Valorant match history and rank data
#[derive(Parser, Debug)]
#[command(name = "valocache")]
#[command(about = "Fetch and cache Valorant match history and rank data")]
#[command(version)]
pub struct Cli {
    /// Player to look up, as Name#Tag
    ///
    /// Examples:
    ///   valocache 'Henrik3#EUW3'
    ///   valocache 'Henrik3#EUW3' --max-age-hours 0    # Force a refresh
    #[arg(value_name = "NAME#TAG")]
    pub player: String,

    /// Refetch cached data at least this many hours old
    #[arg(long, default_value_t = 24)]
    pub max_age_hours: u64,

    /// Stop paging match history after this many matches
    #[arg(long, default_value_t = 50)]
    pub max_matches: usize,

    /// Directory for cached records and the index
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Region used when the account lookup does not report one
    #[arg(long, value_name = "CODE")]
    pub region: Option<String>,

    /// Print a one-line summary instead of the full JSON payload
    #[arg(long)]
    pub summary: bool,
}

impl Cli {
    /// Validates the player argument
    pub fn player_key(&self) -> Result<PlayerKey, CliError> {
        Ok(PlayerKey::parse(&self.player)?)
    }

    /// Refresh options derived from the flags
    pub fn refresh_options(&self) -> RefreshOptions {
        RefreshOptions {
            max_age_hours: self.max_age_hours,
            max_matches: self.max_matches,
        }
    }

    /// Applies command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref dir) = self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(ref region) = self.region {
            config.default_region = region.to_lowercase();
        }
    }
}

/// Formats a payload as a single human-readable line
pub fn summary_line(payload: &PlayerPayload) -> String {
    let rank = payload
        .mmr
        .as_ref()
        .and_then(|mmr| {
            mmr.pointer("/current/tier/name")
                .or_else(|| mmr.pointer("/current_data/currenttierpatched"))
        })
        .and_then(|v| v.as_str())
        .unwrap_or("unranked");

    format!(
        "{} [{}] rank: {}, matches: {}, fetched: {}",
        payload.name_tag,
        payload.region,
        rank,
        payload.matches.len(),
        payload.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}
