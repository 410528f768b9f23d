pub mod aggregator;
pub mod cache;
pub mod config;
pub mod metadata;
pub mod metrics;
pub mod providers;
pub mod testing;
pub mod torrent;

pub use aggregator::{
    AggregateError, AggregationOutcome, Aggregator, ProviderOutcome, ProviderReport,
};
pub use cache::{CacheEntry, CacheError, InMemoryCache, ResultCache};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use metadata::{CinemetaClient, CinemetaConfig, MetadataError, TitleLookup};
pub use providers::{build_providers, RarbgProvider, RequestGate, TpbProvider, YtsProvider};
pub use torrent::{MediaKind, MediaQuery, ProviderError, TorrentProvider, TorrentResult};
