//! Types for torrent lookup across providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::cache::CacheError;
use crate::metadata::MetadataError;

/// A single candidate torrent for a movie or episode.
///
/// Providers only ever hand out results with a non-empty `quality` and a
/// valid 40-character lowercase `info_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentResult {
    /// Display title as reported by the provider.
    pub name: String,
    /// Canonical resolved title (empty if unresolved).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Coarse resolution label, e.g. "1080p" or "720p (cam)".
    pub quality: String,
    /// Info hash (lowercase hex) - used for deduplication.
    pub info_hash: String,
    /// Magnet URI embedding the info hash, display name and trackers.
    pub magnet_url: String,
    /// Seeders reported by the provider (0 = unknown).
    pub seeders: u32,
    /// Size in bytes (0 = unknown).
    pub size: u64,
    /// Whether this result came from a free-text search rather than an ID lookup.
    #[serde(default)]
    pub fuzzy: bool,
}

/// What kind of media a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Episode,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Episode => "episode",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An aggregated query: a movie by ID, or an episode by series ID and title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaQuery {
    Movie { id: String },
    Episode { id: String, title: String },
}

impl MediaQuery {
    pub fn movie(id: impl Into<String>) -> Self {
        MediaQuery::Movie { id: id.into() }
    }

    pub fn episode(id: impl Into<String>, title: impl Into<String>) -> Self {
        MediaQuery::Episode {
            id: id.into(),
            title: title.into(),
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            MediaQuery::Movie { .. } => MediaKind::Movie,
            MediaQuery::Episode { .. } => MediaKind::Episode,
        }
    }

    /// The external identifier (IMDb ID for movies, series ID for episodes).
    pub fn id(&self) -> &str {
        match self {
            MediaQuery::Movie { id } | MediaQuery::Episode { id, .. } => id,
        }
    }
}

/// Errors a provider can report for a single lookup.
///
/// "No results" is never an error: providers return `Ok(vec![])` for that.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("couldn't reach {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("bad GET response: {status}")]
    Status { status: u16 },

    #[error("couldn't parse response: {0}")]
    Parse(String),

    #[error("couldn't refresh token: {0}")]
    Token(String),

    #[error("couldn't resolve title: {0}")]
    TitleLookup(#[from] MetadataError),

    /// The lookup succeeded but the results could not be cached.
    ///
    /// The fetched results travel with the error so they are never lost.
    #[error("couldn't cache torrents: {source}")]
    Cache {
        results: Vec<TorrentResult>,
        #[source]
        source: CacheError,
    },

    #[error("lookup cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Results that survived despite the error, if any.
    ///
    /// Only a failed cache write carries results.
    pub fn into_results(self) -> Option<Vec<TorrentResult>> {
        match self {
            ProviderError::Cache { results, .. } => Some(results),
            _ => None,
        }
    }
}

/// Capability implemented by every torrent source.
///
/// Deadlines are enforced by dropping the returned future, so
/// implementations must not hold state that breaks when cancelled midway.
#[async_trait]
pub trait TorrentProvider: Send + Sync {
    /// Short provider name used in cache keys, logs and metrics.
    fn name(&self) -> &str;

    /// Find torrents for a movie by its IMDb ID.
    async fn find_movie(&self, id: &str) -> Result<Vec<TorrentResult>, ProviderError>;

    /// Find torrents for an episode of the series `id`.
    async fn find_episode(
        &self,
        id: &str,
        title: &str,
    ) -> Result<Vec<TorrentResult>, ProviderError>;

    /// Dispatch a `MediaQuery` to the matching lookup.
    async fn find(&self, query: &MediaQuery) -> Result<Vec<TorrentResult>, ProviderError> {
        match query {
            MediaQuery::Movie { id } => self.find_movie(id).await,
            MediaQuery::Episode { id, title } => self.find_episode(id, title).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_query_serialization() {
        let query = MediaQuery::episode("tt0903747", "S01E01");
        let json = serde_json::to_string(&query).unwrap();
        assert!(json.contains("\"kind\":\"episode\""));

        let parsed: MediaQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, query);
        assert_eq!(parsed.kind(), MediaKind::Episode);
        assert_eq!(parsed.id(), "tt0903747");
    }

    #[test]
    fn test_media_kind_display() {
        assert_eq!(MediaKind::Movie.to_string(), "movie");
        assert_eq!(MediaKind::Episode.to_string(), "episode");
    }

    #[test]
    fn test_torrent_result_skips_empty_title() {
        let result = TorrentResult {
            name: "Movie [1080p] [YTS]".to_string(),
            title: String::new(),
            quality: "1080p".to_string(),
            info_hash: "a".repeat(40),
            magnet_url: "magnet:?xt=urn:btih:aaaa".to_string(),
            seeders: 10,
            size: 1024,
            fuzzy: false,
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("\"title\""));

        let parsed: TorrentResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_into_results_only_for_cache_errors() {
        let results = vec![];
        let err = ProviderError::Cache {
            results: results.clone(),
            source: CacheError::Backend("disk full".to_string()),
        };
        assert_eq!(err.into_results(), Some(results));

        assert!(ProviderError::Status { status: 500 }.into_results().is_none());
    }

    #[test]
    fn test_provider_error_messages() {
        assert_eq!(
            ProviderError::Status { status: 503 }.to_string(),
            "bad GET response: 503"
        );
        assert_eq!(
            ProviderError::Token("token is empty".to_string()).to_string(),
            "couldn't refresh token: token is empty"
        );
    }
}
