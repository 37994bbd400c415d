//! HenrikDev API access
//!
//! This module defines the response types returned by the upstream Valorant
//! statistics service, the `StatsApi` trait the cache talks to, and the
//! rate-limited blocking client that implements it.

pub mod client;
pub mod rate_limit;

pub use client::HenrikClient;
pub use rate_limit::{Clock, RateLimiter, SystemClock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Default match mode requested when paging through history
pub const DEFAULT_MODE: &str = "competitive";

/// Default platform used for MMR lookups
pub const DEFAULT_PLATFORM: &str = "pc";

/// Errors that can occur when talking to the HenrikDev API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service reported that the requested resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The service answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// HTTP request failed (connection, timeout, or body decoding)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API key cannot be sent as a header value
    #[error("API key contains characters not allowed in an HTTP header")]
    InvalidApiKey,

    /// The configured base URL cannot carry path segments
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Result alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Standard response envelope: `{ "status": 200, "data": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Status code echoed in the body by the service
    #[serde(default)]
    pub status: u16,
    /// Response payload, absent when the service has nothing to report
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Wraps data in a successful envelope
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            data: Some(data),
        }
    }

    /// Whether the envelope reports success
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Account details returned by the account lookup endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub puuid: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub account_level: Option<u32>,
}

/// Read operations the cache needs from the statistics service
///
/// Methods take `&mut self` because every call passes through the
/// implementor's rate governor, which admits one request at a time.
pub trait StatsApi {
    /// Looks up an account by its name and tag
    fn resolve_tag(&mut self, name: &str, tag: &str) -> ApiResult<ApiResponse<Account>>;

    /// Fetches one page of match history; an empty page marks the end
    fn matches(
        &mut self,
        region: &str,
        name: &str,
        tag: &str,
        mode: &str,
        size: usize,
        start: usize,
    ) -> ApiResult<ApiResponse<Vec<Value>>>;

    /// Fetches the current rank/MMR snapshot
    fn mmr(
        &mut self,
        region: &str,
        name: &str,
        tag: &str,
        platform: &str,
    ) -> ApiResult<ApiResponse<Value>>;
}
