//! Concrete torrent providers and the plumbing they share.
//!
//! Every provider checks its cache before going upstream and stores what it
//! fetched afterwards. A cache read error is treated as a miss; a cache
//! write error surfaces as `ProviderError::Cache` carrying the results.

mod rarbg;
mod throttle;
mod tpb;
mod yts;

pub use rarbg::RarbgProvider;
pub use throttle::RequestGate;
pub use tpb::TpbProvider;
pub use yts::YtsProvider;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{cache_key, ResultCache};
use crate::config::ProvidersConfig;
use crate::metadata::TitleLookup;
use crate::metrics::CACHE_LOOKUPS;
use crate::torrent::{ProviderError, TorrentProvider, TorrentResult};

/// Build the enabled providers in query order (YTS, TPB, RARBG).
pub fn build_providers(
    config: &ProvidersConfig,
    cache: Arc<dyn ResultCache>,
    titles: Arc<dyn TitleLookup>,
) -> Result<Vec<Arc<dyn TorrentProvider>>, ProviderError> {
    let mut providers: Vec<Arc<dyn TorrentProvider>> = Vec::new();

    if config.yts.enabled {
        providers.push(Arc::new(YtsProvider::new(&config.yts, Arc::clone(&cache))?));
    }
    if config.tpb.enabled {
        providers.push(Arc::new(TpbProvider::new(
            &config.tpb,
            Arc::clone(&cache),
            titles,
        )?));
    }
    if config.rarbg.enabled {
        providers.push(Arc::new(RarbgProvider::new(&config.rarbg, cache)?));
    }

    info!(
        providers = ?providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
        "Torrent providers configured"
    );

    Ok(providers)
}

/// Build an HTTP client with a per-request timeout.
fn http_client(timeout: Duration, user_agent: Option<&str>) -> Result<Client, ProviderError> {
    let mut builder = Client::builder().timeout(timeout);
    if let Some(user_agent) = user_agent {
        builder = builder.user_agent(user_agent);
    }
    builder
        .build()
        .map_err(|e| ProviderError::Other(format!("couldn't build HTTP client: {}", e)))
}

/// Send a GET and decode a JSON body.
///
/// Anything but 200 is a `Status` error; the body is not read in that case.
async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    url: &str,
) -> Result<T, ProviderError> {
    let response = request.send().await.map_err(|source| ProviderError::Http {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(ProviderError::Status {
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|source| ProviderError::Http {
        url: url.to_string(),
        source,
    })?;

    serde_json::from_slice(&body).map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Read a count that upstreams send either as a JSON number or a string.
fn lenient_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Cache id for an episode lookup.
///
/// Episodes of one series share the series id, so the title is part of the key.
fn episode_cache_id(id: &str, title: &str) -> String {
    format!("{}:{}", id, title)
}

/// Cache access on behalf of one provider.
struct ProviderCache {
    provider: &'static str,
    cache: Arc<dyn ResultCache>,
    max_age: Duration,
}

impl ProviderCache {
    fn new(provider: &'static str, cache: Arc<dyn ResultCache>, max_age: Duration) -> Self {
        Self {
            provider,
            cache,
            max_age,
        }
    }

    fn key(&self, id: &str) -> String {
        cache_key(id, self.provider)
    }

    /// Fresh cached results for `id`, if any.
    async fn lookup(&self, id: &str) -> Option<Vec<TorrentResult>> {
        let key = self.key(id);
        let (result, found) = match self.cache.get(&key).await {
            Ok(Some(entry)) if entry.is_fresh(self.max_age) => ("hit", Some(entry.results)),
            Ok(Some(_)) => ("stale", None),
            Ok(None) => ("miss", None),
            Err(e) => {
                warn!(provider = self.provider, key = %key, error = %e, "Cache read failed");
                ("error", None)
            }
        };

        CACHE_LOOKUPS
            .with_label_values(&[self.provider, result])
            .inc();
        debug!(provider = self.provider, key = %key, result, "Cache lookup");

        found
    }

    /// Store freshly fetched results, handing them back either way.
    async fn store(
        &self,
        id: &str,
        results: Vec<TorrentResult>,
    ) -> Result<Vec<TorrentResult>, ProviderError> {
        let key = self.key(id);
        match self.cache.set(&key, results.clone()).await {
            Ok(()) => Ok(results),
            Err(source) => Err(ProviderError::Cache { results, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, InMemoryCache};
    use crate::testing::{fixtures, MockCache, MockTitleLookup};
    use chrono::Utc;

    const HASH: &str = "0123456789abcdef0123456789abcdef01234567";

    fn provider_cache(cache: Arc<dyn ResultCache>) -> ProviderCache {
        ProviderCache::new("yts", cache, Duration::from_secs(3600))
    }

    #[test]
    fn test_lenient_count() {
        assert_eq!(lenient_count(&Value::from(42)), 42);
        assert_eq!(lenient_count(&Value::from("1337")), 1337);
        assert_eq!(lenient_count(&Value::from("n/a")), 0);
        assert_eq!(lenient_count(&Value::from(-1)), 0);
        assert_eq!(lenient_count(&Value::Null), 0);
    }

    #[tokio::test]
    async fn test_lookup_fresh_stale_and_missing() {
        let cache = Arc::new(MockCache::new());
        let results = vec![fixtures::torrent_result("Movie", HASH)];
        cache
            .insert(
                "tt1-YTS",
                CacheEntry {
                    results: results.clone(),
                    created_at: Utc::now(),
                },
            )
            .await;
        cache
            .insert(
                "tt2-YTS",
                CacheEntry {
                    results: results.clone(),
                    created_at: Utc::now() - chrono::Duration::hours(2),
                },
            )
            .await;

        let lookup = provider_cache(cache);
        assert_eq!(lookup.lookup("tt1").await, Some(results));
        assert_eq!(lookup.lookup("tt2").await, None);
        assert_eq!(lookup.lookup("tt3").await, None);
    }

    #[test]
    fn test_episode_cache_id_separates_episodes() {
        let first = episode_cache_id("tt0903747", "Breaking Bad S01E01");
        let second = episode_cache_id("tt0903747", "Breaking Bad S01E02");

        assert_ne!(first, second);
        assert_eq!(cache_key(&first, "tpb"), "tt0903747:Breaking Bad S01E01-TPB");
    }

    #[tokio::test]
    async fn test_lookup_read_error_is_a_miss() {
        let lookup = provider_cache(Arc::new(MockCache::new().failing_reads()));
        assert_eq!(lookup.lookup("tt1").await, None);
    }

    #[tokio::test]
    async fn test_store_write_error_keeps_results() {
        let lookup = provider_cache(Arc::new(MockCache::new().failing_writes()));
        let results = vec![fixtures::torrent_result("Movie", HASH)];

        let err = lookup.store("tt1", results.clone()).await.unwrap_err();
        assert!(err.to_string().starts_with("couldn't cache torrents"));
        assert_eq!(err.into_results(), Some(results));
    }

    #[tokio::test]
    async fn test_build_providers_skips_disabled() {
        let mut config = ProvidersConfig::default();
        config.tpb.enabled = false;

        let providers = build_providers(
            &config,
            Arc::new(InMemoryCache::new()),
            Arc::new(MockTitleLookup::new()),
        )
        .unwrap();

        let names: Vec<_> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["yts", "rarbg"]);
    }
}
