//! YTS (yts.mx) provider. Movies only, looked up by IMDb ID.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{get_json, http_client, lenient_count, ProviderCache};
use crate::cache::ResultCache;
use crate::config::YtsConfig;
use crate::torrent::{
    build_magnet_url, parse_info_hash, ProviderError, TorrentProvider, TorrentResult,
};

const NAME: &str = "yts";

const TRACKERS: &[&str] = &[
    "udp://open.demonii.com:1337/announce",
    "udp://tracker.openbittorrent.com:80",
    "udp://tracker.coppersurfer.tk:6969",
    "udp://glotorrents.pw:6969/announce",
    "udp://tracker.opentrackr.org:1337/announce",
    "udp://torrent.gresille.org:80/announce",
    "udp://p4p.arenabg.com:1337",
    "udp://tracker.leechers-paradise.org:6969",
];

const QUALITIES: &[&str] = &["720p", "1080p", "2160p"];

#[derive(Debug, Deserialize)]
struct ListMoviesResponse {
    #[serde(default)]
    data: Option<ListMoviesData>,
}

#[derive(Debug, Deserialize)]
struct ListMoviesData {
    #[serde(default)]
    movies: Option<Vec<YtsMovie>>,
}

#[derive(Debug, Deserialize)]
struct YtsMovie {
    #[serde(default)]
    title: String,
    #[serde(default)]
    torrents: Option<Vec<YtsTorrent>>,
}

#[derive(Debug, Deserialize)]
struct YtsTorrent {
    #[serde(default)]
    quality: String,
    #[serde(default)]
    hash: String,
    /// Rip type, e.g. "web" or "bluray".
    #[serde(default, rename = "type")]
    rip_type: Option<String>,
    /// Counts occasionally arrive as strings or floats.
    #[serde(default)]
    size_bytes: Value,
    #[serde(default)]
    seeds: Value,
}

/// YTS torrent provider.
pub struct YtsProvider {
    client: Client,
    base_url: String,
    cache: ProviderCache,
}

impl YtsProvider {
    pub fn new(config: &YtsConfig, cache: Arc<dyn ResultCache>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(Duration::from_secs(config.timeout_secs), None)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache: ProviderCache::new(
                NAME,
                cache,
                Duration::from_secs(config.cache_age_secs),
            ),
        })
    }
}

#[async_trait]
impl TorrentProvider for YtsProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn find_movie(&self, id: &str) -> Result<Vec<TorrentResult>, ProviderError> {
        if let Some(results) = self.cache.lookup(id).await {
            return Ok(results);
        }

        let url = format!(
            "{}/api/v2/list_movies.json?query_term={}",
            self.base_url,
            urlencoding::encode(id)
        );
        debug!(provider = NAME, id, "Querying upstream");

        let response: ListMoviesResponse = get_json(self.client.get(&url), &url).await?;

        let Some(movie) = response
            .data
            .and_then(|d| d.movies)
            .and_then(|movies| movies.into_iter().next())
        else {
            return Ok(Vec::new());
        };

        let torrents = movie.torrents.unwrap_or_default();
        if torrents.is_empty() {
            return Ok(Vec::new());
        }

        let results = torrents
            .into_iter()
            .filter_map(|torrent| to_result(&movie.title, torrent))
            .collect::<Vec<_>>();

        debug!(provider = NAME, id, results = results.len(), "Upstream answered");
        self.cache.store(id, results).await
    }

    async fn find_episode(
        &self,
        _id: &str,
        _title: &str,
    ) -> Result<Vec<TorrentResult>, ProviderError> {
        Ok(Vec::new())
    }
}

fn to_result(title: &str, torrent: YtsTorrent) -> Option<TorrentResult> {
    if !QUALITIES.contains(&torrent.quality.as_str()) {
        return None;
    }
    let info_hash = parse_info_hash(&torrent.hash)?;

    let mut quality = torrent.quality;
    if let Some(rip_type) = torrent.rip_type.filter(|t| !t.is_empty()) {
        quality = format!("{} ({})", quality, rip_type);
    }

    Some(TorrentResult {
        name: format!("{} [{}] [YTS]", title, quality),
        title: title.to_string(),
        magnet_url: build_magnet_url(&info_hash, title, TRACKERS),
        quality,
        info_hash,
        seeders: u32::try_from(lenient_count(&torrent.seeds)).unwrap_or(u32::MAX),
        size: lenient_count(&torrent.size_bytes),
        fuzzy: false,
    })
}
