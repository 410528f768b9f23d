//! Cinemeta (Stremio's public metadata addon) client.
//!
//! No API key is needed. Lookups are by IMDb ID.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{MetadataError, TitleLookup};

/// Cinemeta client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CinemetaConfig {
    /// Base URL (default: https://v3-cinemeta.strem.io).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 5).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://v3-cinemeta.strem.io".to_string()
}

fn default_timeout() -> u64 {
    5
}

impl Default for CinemetaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Cinemeta API client.
pub struct CinemetaClient {
    client: Client,
    base_url: String,
}

impl CinemetaClient {
    /// Create a new Cinemeta client.
    pub fn new(config: CinemetaConfig) -> Result<Self, MetadataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_name(&self, media_type: &str, id: &str) -> Result<String, MetadataError> {
        let url = format!(
            "{}/meta/{}/{}.json",
            self.base_url,
            media_type,
            urlencoding::encode(id)
        );

        debug!("Cinemeta lookup: type={}, id={}", media_type, id);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == 404 {
            return Err(MetadataError::NotFound(format!("{} {}", media_type, id)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let meta: CinemetaResponse = response.json().await.map_err(|e| {
            MetadataError::ParseError(format!("Failed to parse meta response: {}", e))
        })?;

        meta.meta
            .map(|m| m.name)
            .ok_or_else(|| MetadataError::NotFound(format!("{} {}", media_type, id)))
    }
}

#[async_trait]
impl TitleLookup for CinemetaClient {
    async fn movie_title(&self, id: &str) -> Result<String, MetadataError> {
        self.fetch_name("movie", id).await
    }

    async fn series_title(&self, id: &str) -> Result<String, MetadataError> {
        self.fetch_name("series", id).await
    }
}

// Cinemeta API response types

#[derive(Debug, Deserialize)]
struct CinemetaResponse {
    #[serde(default)]
    meta: Option<CinemetaMeta>,
}

#[derive(Debug, Deserialize)]
struct CinemetaMeta {
    #[serde(default)]
    name: String,
}
