//! Blocking HenrikDev API client
//!
//! Issues account, match-history and MMR requests against the HenrikDev
//! Valorant API. Every request passes through a [`RateLimiter`] owned by the
//! client, so independent clients are limited independently.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::rate_limit::RateLimiter;
use super::{Account, ApiError, ApiResponse, ApiResult, StatsApi};
use crate::config::Config;

/// Base URL for the HenrikDev API
pub const HENRIK_BASE_URL: &str = "https://api.henrikdev.xyz";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the HenrikDev Valorant API
#[derive(Debug)]
pub struct HenrikClient {
    http_client: Client,
    base_url: Url,
    limiter: RateLimiter,
}

impl HenrikClient {
    /// Creates a client from the application configuration
    pub fn new(config: &Config) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ApiError::InvalidApiKey)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http_client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        Self::with_client(http_client, &config.base_url, config.rate_per_minute)
    }

    /// Creates a client around a pre-built HTTP client
    pub fn with_client(http_client: Client, base_url: &str, rate_per_minute: u32) -> ApiResult<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            http_client,
            base_url,
            limiter: RateLimiter::per_minute(rate_per_minute),
        })
    }

    /// Builds an endpoint URL, percent-encoding each path segment
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issues a rate-limited GET and decodes the JSON body
    fn get<T: DeserializeOwned>(&mut self, url: Url, query: &[(&str, String)]) -> ApiResult<T> {
        let waited = self.limiter.acquire();
        if !waited.is_zero() {
            debug!(wait_ms = waited.as_millis() as u64, "Request delayed by rate limiter");
        }

        debug!(%url, "GET");
        let response = self.http_client.get(url.clone()).query(query).send()?;
        check_status(response.status(), &url)?;
        Ok(response.json::<T>()?)
    }
}

/// Maps a non-success status to an error
fn check_status(status: StatusCode, url: &Url) -> ApiResult<()> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::NOT_FOUND {
        Err(ApiError::NotFound(url.path().to_string()))
    } else {
        Err(ApiError::Status {
            status,
            url: url.to_string(),
        })
    }
}

impl StatsApi for HenrikClient {
    fn resolve_tag(&mut self, name: &str, tag: &str) -> ApiResult<ApiResponse<Account>> {
        let url = self.endpoint(&["valorant", "v2", "account", name, tag])?;
        self.get(url, &[])
    }

    fn matches(
        &mut self,
        region: &str,
        name: &str,
        tag: &str,
        mode: &str,
        size: usize,
        start: usize,
    ) -> ApiResult<ApiResponse<Vec<Value>>> {
        let url = self.endpoint(&["valorant", "v3", "matches", region, name, tag])?;
        let query = [
            ("mode", mode.to_string()),
            ("size", size.to_string()),
            ("start", start.to_string()),
        ];
        self.get(url, &query)
    }

    fn mmr(
        &mut self,
        region: &str,
        name: &str,
        tag: &str,
        platform: &str,
    ) -> ApiResult<ApiResponse<Value>> {
        let url = self.endpoint(&["valorant", "v3", "mmr", region, platform, name, tag])?;
        self.get(url, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> HenrikClient {
        HenrikClient::with_client(Client::new(), base_url, 30).expect("valid base URL")
    }

    #[test]
    fn test_account_endpoint() {
        let client = test_client(HENRIK_BASE_URL);
        let url = client
            .endpoint(&["valorant", "v2", "account", "Henrik3", "EUW3"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.henrikdev.xyz/valorant/v2/account/Henrik3/EUW3"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = test_client(HENRIK_BASE_URL);
        let url = client
            .endpoint(&["valorant", "v2", "account", "Some Name", "a/b#c"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.henrikdev.xyz/valorant/v2/account/Some%20Name/a%2Fb%23c"
        );
    }

    #[test]
    fn test_endpoint_respects_base_path() {
        let client = test_client("http://localhost:8080/proxy/");
        let url = client
            .endpoint(&["valorant", "v3", "mmr", "eu", "pc", "Name", "Tag"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/proxy/valorant/v3/mmr/eu/pc/Name/Tag"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = HenrikClient::with_client(Client::new(), "not a url", 30);
        assert!(matches!(result, Err(ApiError::InvalidBaseUrl(_))));

        let result = HenrikClient::with_client(Client::new(), "mailto:someone@example.com", 30);
        assert!(matches!(result, Err(ApiError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_check_status() {
        let url = Url::parse("https://api.henrikdev.xyz/valorant/v2/account/A/B").unwrap();

        assert!(check_status(StatusCode::OK, &url).is_ok());
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, &url),
            Err(ApiError::NotFound(_))
        ));
        match check_status(StatusCode::TOO_MANY_REQUESTS, &url) {
            Err(ApiError::Status { status, url }) => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert!(url.contains("/account/A/B"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
        assert!(check_status(StatusCode::INTERNAL_SERVER_ERROR, &url).is_err());
    }

    #[test]
    fn test_new_from_config() {
        let config = Config::new("HDEV-test-key");
        let client = HenrikClient::new(&config).expect("client should build");
        assert_eq!(client.base_url.as_str(), "https://api.henrikdev.xyz/");
        assert_eq!(client.limiter.limit(), 30);
    }

    #[test]
    fn test_new_rejects_unprintable_key() {
        let config = Config::new("bad\nkey");
        assert!(matches!(
            HenrikClient::new(&config),
            Err(ApiError::InvalidApiKey)
        ));
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod http_tests;
