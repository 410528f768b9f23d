//! RARBG provider, via torrentapi.
//!
//! torrentapi wants a token on every request and at most one request every
//! couple of seconds per client; both are handled by a `RequestGate`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{episode_cache_id, get_json, http_client, ProviderCache, RequestGate};
use crate::cache::ResultCache;
use crate::config::RarbgConfig;
use crate::torrent::{
    info_hash_from_magnet, resolution_from_name, ProviderError, TorrentProvider, TorrentResult,
};

const NAME: &str = "rarbg";

const USER_AGENT: &str = "curl/7.47.0";

/// torrentapi's error code for an expired or unknown token.
const ERROR_CODE_BAD_TOKEN: u32 = 4;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    torrent_results: Option<Vec<RarbgTorrent>>,
    #[serde(default)]
    error_code: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RarbgTorrent {
    #[serde(default)]
    title: String,
    /// Magnet link.
    #[serde(default)]
    download: String,
    #[serde(default)]
    seeders: Option<u32>,
    #[serde(default)]
    size: Option<u64>,
}

/// RARBG torrent provider.
pub struct RarbgProvider {
    client: Client,
    base_url: String,
    app_id: String,
    cache: ProviderCache,
    gate: RequestGate,
}

impl RarbgProvider {
    pub fn new(config: &RarbgConfig, cache: Arc<dyn ResultCache>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(Duration::from_secs(config.timeout_secs), Some(USER_AGENT))?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_id: config.app_id.clone(),
            cache: ProviderCache::new(
                NAME,
                cache,
                Duration::from_secs(config.cache_age_secs),
            ),
            gate: RequestGate::new(
                Duration::from_millis(config.min_interval_ms),
                Duration::from_secs(config.token_ttl_secs),
            ),
        })
    }

    async fn fetch_token(&self) -> Result<String, ProviderError> {
        let url = format!(
            "{}/pubapi_v2.php?app_id={}&get_token=get_token",
            self.base_url,
            urlencoding::encode(&self.app_id)
        );
        debug!(provider = NAME, "Requesting token");

        let response: TokenResponse =
            get_json(self.client.get(&url).header(ACCEPT, "*/*"), &url).await?;
        Ok(response.token)
    }

    /// Run a search with an already escaped `search_*` parameter and cache
    /// the answer under `cache_id`.
    async fn search(
        &self,
        cache_id: &str,
        search: &str,
    ) -> Result<Vec<TorrentResult>, ProviderError> {
        if let Some(results) = self.cache.lookup(cache_id).await {
            return Ok(results);
        }

        let token = self.gate.acquire_slot(|| self.fetch_token()).await?;
        let url = format!(
            "{}/pubapi_v2.php?app_id={}&mode=search&sort=seeders&format=json_extended&ranked=0&token={}&{}",
            self.base_url,
            urlencoding::encode(&self.app_id),
            urlencoding::encode(&token),
            search
        );
        debug!(provider = NAME, id = cache_id, "Querying upstream");

        let response: SearchResponse =
            get_json(self.client.get(&url).header(ACCEPT, "*/*"), &url).await?;

        if response.error_code == Some(ERROR_CODE_BAD_TOKEN) {
            // Next lookup starts with a fresh token
            self.gate.invalidate_token().await;
            return Err(ProviderError::Token("token rejected by upstream".to_string()));
        }

        let torrents = response.torrent_results.unwrap_or_default();
        if torrents.is_empty() {
            return Ok(Vec::new());
        }

        let results = torrents
            .into_iter()
            .filter_map(to_result)
            .collect::<Vec<_>>();

        debug!(provider = NAME, id = cache_id, results = results.len(), "Upstream answered");
        self.cache.store(cache_id, results).await
    }
}

#[async_trait]
impl TorrentProvider for RarbgProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn find_movie(&self, id: &str) -> Result<Vec<TorrentResult>, ProviderError> {
        let search = format!("search_imdb={}", urlencoding::encode(id));
        self.search(id, &search).await
    }

    async fn find_episode(
        &self,
        id: &str,
        title: &str,
    ) -> Result<Vec<TorrentResult>, ProviderError> {
        let search = format!("search_string={}", urlencoding::encode(title));
        self.search(&episode_cache_id(id, title), &search).await
    }
}

fn to_result(torrent: RarbgTorrent) -> Option<TorrentResult> {
    let quality = resolution_from_name(&torrent.title)?;
    let info_hash = info_hash_from_magnet(&torrent.download)?;

    Some(TorrentResult {
        name: torrent.title,
        title: String::new(),
        quality: quality.to_string(),
        info_hash,
        magnet_url: torrent.download,
        seeders: torrent.seeders.unwrap_or(0),
        size: torrent.size.unwrap_or(0),
        fuzzy: false,
    })
}
