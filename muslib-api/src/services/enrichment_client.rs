//! Song detail enrichment client
//!
//! Fetches release date, lyrics and a reference link for a group/title pair
//! from an external metadata service. One attempt per lookup: no retries, no
//! rate limiting, no circuit breaking.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("muslib/", env!("CARGO_PKG_VERSION"));

/// Enrichment lookup errors
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// The service answered with a status other than 200
    #[error("Lookup failed with HTTP status {0}")]
    LookupFailed(u16),

    /// The service could not be reached (DNS, connect, timeout, broken body)
    #[error("Lookup service unavailable: {0}")]
    LookupUnavailable(String),

    /// The service answered 200 with a body that is not the expected JSON
    #[error("Malformed lookup response: {0}")]
    LookupMalformed(String),
}

/// Metadata returned by a successful lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SongDetail {
    pub release_date: String,
    pub text: String,
    pub link: String,
}

/// Wire shape of the lookup response; absent or null fields become empty.
#[derive(Debug, Deserialize)]
struct SongDetailResponse {
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

impl From<SongDetailResponse> for SongDetail {
    fn from(response: SongDetailResponse) -> Self {
        Self {
            release_date: response.release_date.unwrap_or_default(),
            text: response.text.unwrap_or_default(),
            link: response.link.unwrap_or_default(),
        }
    }
}

/// Source of song details used by song creation
#[async_trait]
pub trait SongDetailSource: Send + Sync {
    async fn lookup(&self, group: &str, title: &str) -> Result<SongDetail, EnrichmentError>;
}

/// HTTP client for the external song detail service
pub struct EnrichmentClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl EnrichmentClient {
    /// Create a client for `base_url`
    ///
    /// `timeout` bounds each request; `None` keeps the transport default.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, EnrichmentError> {
        let base_url = base_url.into();

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        // Loopback endpoints are never reached through an environment proxy
        if is_loopback(&base_url) {
            builder = builder.no_proxy();
        }

        let http_client = builder
            .build()
            .map_err(|e| EnrichmentError::LookupUnavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn is_loopback(url: &str) -> bool {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]"))
        .unwrap_or(false)
}

#[async_trait]
impl SongDetailSource for EnrichmentClient {
    async fn lookup(&self, group: &str, title: &str) -> Result<SongDetail, EnrichmentError> {
        tracing::debug!(group = %group, title = %title, url = %self.base_url, "Querying enrichment service");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("group", group), ("song", title)])
            .send()
            .await
            .map_err(|e| EnrichmentError::LookupUnavailable(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(EnrichmentError::LookupFailed(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| EnrichmentError::LookupUnavailable(e.to_string()))?;

        let detail: SongDetailResponse = serde_json::from_slice(&body)
            .map_err(|e| EnrichmentError::LookupMalformed(e.to_string()))?;

        Ok(detail.into())
    }
}
