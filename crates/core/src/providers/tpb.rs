//! The Pirate Bay provider, via the apibay JSON API.
//!
//! apibay can search by IMDb ID for movies, but episodes need a free-text
//! query built from the series name, so results for those are fuzzy.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{episode_cache_id, get_json, http_client, lenient_count, ProviderCache};
use crate::cache::ResultCache;
use crate::config::TpbConfig;
use crate::metadata::TitleLookup;
use crate::torrent::{
    build_magnet_url, parse_info_hash, quality_from_name, ProviderError, TorrentProvider,
    TorrentResult,
};

const NAME: &str = "tpb";

/// apibay category for HD TV shows.
const CATEGORY_TV_HD: u32 = 208;

const TRACKERS: &[&str] = &[
    "udp://tracker.coppersurfer.tk:6969/announce",
    "udp://9.rarbg.to:2920/announce",
    "udp://tracker.opentrackr.org:1337",
    "udp://tracker.internetwarriors.net:1337/announce",
    "udp://tracker.leechers-paradise.org:6969/announce",
    "udp://tracker.coppersurfer.tk:6969/announce",
    "udp://tracker.pirateparty.gr:6969/announce",
    "udp://tracker.cyberia.is:6969/announce",
];

/// One entry of apibay's `q.php` answer. Counts arrive as strings.
#[derive(Debug, Deserialize)]
struct ApibayTorrent {
    #[serde(default)]
    name: String,
    #[serde(default)]
    info_hash: String,
    #[serde(default)]
    seeders: Value,
    #[serde(default)]
    size: Value,
}

/// The Pirate Bay torrent provider.
pub struct TpbProvider {
    client: Client,
    base_url: String,
    cache: ProviderCache,
    titles: Arc<dyn TitleLookup>,
}

impl TpbProvider {
    pub fn new(
        config: &TpbConfig,
        cache: Arc<dyn ResultCache>,
        titles: Arc<dyn TitleLookup>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(Duration::from_secs(config.timeout_secs), None)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache: ProviderCache::new(
                NAME,
                cache,
                Duration::from_secs(config.cache_age_secs),
            ),
            titles,
        })
    }

    /// Run `q.php` with an already escaped query string and cache the
    /// answer under `cache_id`.
    async fn search(
        &self,
        cache_id: &str,
        title: &str,
        escaped_query: &str,
        fuzzy: bool,
    ) -> Result<Vec<TorrentResult>, ProviderError> {
        let url = format!("{}/q.php?q={}", self.base_url, escaped_query);
        debug!(provider = NAME, id = cache_id, fuzzy, "Querying upstream");

        let torrents: Vec<ApibayTorrent> = get_json(self.client.get(&url), &url).await?;
        if torrents.is_empty() {
            return Ok(Vec::new());
        }

        let results = torrents
            .into_iter()
            .filter_map(|torrent| to_result(title, torrent, fuzzy))
            .collect::<Vec<_>>();

        debug!(provider = NAME, id = cache_id, results = results.len(), "Upstream answered");
        self.cache.store(cache_id, results).await
    }
}

#[async_trait]
impl TorrentProvider for TpbProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn find_movie(&self, id: &str) -> Result<Vec<TorrentResult>, ProviderError> {
        if let Some(results) = self.cache.lookup(id).await {
            return Ok(results);
        }

        let title = self.titles.movie_title(id).await?;
        let escaped = urlencoding::encode(id);
        self.search(id, &title, &escaped, false).await
    }

    async fn find_episode(
        &self,
        id: &str,
        title: &str,
    ) -> Result<Vec<TorrentResult>, ProviderError> {
        let cache_id = episode_cache_id(id, title);
        if let Some(results) = self.cache.lookup(&cache_id).await {
            return Ok(results);
        }

        let series = self.titles.series_title(id).await?;
        let title = if series.is_empty() {
            title.to_string()
        } else {
            format!("{} {}", series, title)
        };

        let escaped = format!("{}&cat={}", urlencoding::encode(&title), CATEGORY_TV_HD);
        self.search(&cache_id, &title, &escaped, true).await
    }
}

fn to_result(title: &str, torrent: ApibayTorrent, fuzzy: bool) -> Option<TorrentResult> {
    let quality = quality_from_name(&torrent.name)?;
    let info_hash = parse_info_hash(&torrent.info_hash)?;
    // apibay's "No results returned" placeholder
    if info_hash.bytes().all(|b| b == b'0') {
        return None;
    }

    Some(TorrentResult {
        magnet_url: build_magnet_url(&info_hash, title, TRACKERS),
        name: torrent.name,
        title: title.to_string(),
        quality,
        info_hash,
        seeders: u32::try_from(lenient_count(&torrent.seeders)).unwrap_or(u32::MAX),
        size: lenient_count(&torrent.size),
        fuzzy,
    })
}
