//! Testing utilities and mock implementations.
//!
//! This module provides scripted doubles for the provider, title lookup and
//! cache seams, allowing aggregation tests without real upstreams.
//!
//! # Example
//!
//! ```rust,ignore
//! use magnetar_core::testing::{fixtures, MockProvider, MockTitleLookup};
//!
//! let provider = MockProvider::new("mock")
//!     .with_results(vec![fixtures::torrent_result("Movie 1080p", HASH)]);
//! let titles = MockTitleLookup::new().with_movie("tt0133093", "The Matrix");
//! ```

mod mock_cache;
mod mock_provider;
mod mock_title_lookup;

pub use mock_cache::MockCache;
pub use mock_provider::MockProvider;
pub use mock_title_lookup::{MockTitleLookup, RecordedLookup};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::torrent::{build_magnet_url, TorrentResult};

    /// Create a test result with reasonable defaults.
    pub fn torrent_result(name: &str, info_hash: &str) -> TorrentResult {
        TorrentResult {
            name: name.to_string(),
            title: String::new(),
            quality: "1080p".to_string(),
            info_hash: info_hash.to_string(),
            magnet_url: build_magnet_url(info_hash, name, &[]),
            seeders: 10,
            size: 1024 * 1024 * 700, // 700 MB
            fuzzy: false,
        }
    }

    /// Create a fuzzy episode result, as text-search providers return them.
    pub fn episode_result(name: &str, info_hash: &str) -> TorrentResult {
        TorrentResult {
            fuzzy: true,
            ..torrent_result(name, info_hash)
        }
    }
}
