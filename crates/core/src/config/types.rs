use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::metadata::CinemetaConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cinemeta: CinemetaConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Aggregator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AggregatorConfig {
    /// Per-provider timeout for one aggregated query, in milliseconds.
    #[serde(default = "default_aggregator_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_aggregator_timeout_ms(),
        }
    }
}

fn default_aggregator_timeout_ms() -> u64 {
    10_000
}

/// Per-provider sections
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub yts: YtsConfig,
    #[serde(default)]
    pub tpb: TpbConfig,
    #[serde(default)]
    pub rarbg: RarbgConfig,
}

impl ProvidersConfig {
    /// Summary of every provider, enabled or not, in query order.
    pub fn summaries(&self) -> Vec<ProviderSummary> {
        vec![
            ProviderSummary {
                name: "yts".to_string(),
                enabled: self.yts.enabled,
                base_url: self.yts.base_url.clone(),
                timeout_secs: self.yts.timeout_secs,
                cache_age_secs: self.yts.cache_age_secs,
            },
            ProviderSummary {
                name: "tpb".to_string(),
                enabled: self.tpb.enabled,
                base_url: self.tpb.base_url.clone(),
                timeout_secs: self.tpb.timeout_secs,
                cache_age_secs: self.tpb.cache_age_secs,
            },
            ProviderSummary {
                name: "rarbg".to_string(),
                enabled: self.rarbg.enabled,
                base_url: self.rarbg.base_url.clone(),
                timeout_secs: self.rarbg.timeout_secs,
                cache_age_secs: self.rarbg.cache_age_secs,
            },
        ]
    }
}

fn default_true() -> bool {
    true
}

fn default_provider_timeout() -> u64 {
    5
}

fn default_cache_age() -> u64 {
    24 * 60 * 60
}

/// YTS provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YtsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_yts_url")]
    pub base_url: String,
    /// Upstream request timeout in seconds (default: 5)
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
    /// How long a cached lookup stays usable, in seconds (default: 24h)
    #[serde(default = "default_cache_age")]
    pub cache_age_secs: u64,
}

impl Default for YtsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_yts_url(),
            timeout_secs: default_provider_timeout(),
            cache_age_secs: default_cache_age(),
        }
    }
}

fn default_yts_url() -> String {
    DEFAULT_YTS_URL.to_string()
}

/// The Pirate Bay (apibay) provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TpbConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_tpb_url")]
    pub base_url: String,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_age")]
    pub cache_age_secs: u64,
}

impl Default for TpbConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_tpb_url(),
            timeout_secs: default_provider_timeout(),
            cache_age_secs: default_cache_age(),
        }
    }
}

fn default_tpb_url() -> String {
    DEFAULT_TPB_URL.to_string()
}

/// RARBG torrentapi provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RarbgConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_rarbg_url")]
    pub base_url: String,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_age")]
    pub cache_age_secs: u64,
    /// Minimum spacing between upstream requests (default: 2000)
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// How long a token is reused before refreshing (default: 14 minutes)
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    #[serde(default = "default_app_id")]
    pub app_id: String,
}

impl Default for RarbgConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_rarbg_url(),
            timeout_secs: default_provider_timeout(),
            cache_age_secs: default_cache_age(),
            min_interval_ms: default_min_interval_ms(),
            token_ttl_secs: default_token_ttl(),
            app_id: default_app_id(),
        }
    }
}

fn default_rarbg_url() -> String {
    DEFAULT_RARBG_URL.to_string()
}

fn default_min_interval_ms() -> u64 {
    2000
}

fn default_token_ttl() -> u64 {
    14 * 60
}

fn default_app_id() -> String {
    "magnetar".to_string()
}

pub const DEFAULT_YTS_URL: &str = "https://yts.mx";
pub const DEFAULT_TPB_URL: &str = "https://apibay.org";
pub const DEFAULT_RARBG_URL: &str = "https://torrentapi.org";

/// Provider settings common to all upstreams
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    pub name: String,
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
    pub cache_age_secs: u64,
}

/// Config view for API responses
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub aggregator: AggregatorConfig,
    pub providers: Vec<ProviderSummary>,
    pub cinemeta: CinemetaConfig,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            aggregator: config.aggregator.clone(),
            providers: config.providers.summaries(),
            cinemeta: config.cinemeta.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.aggregator.timeout_ms, 10_000);
        assert_eq!(config.providers.yts.base_url, "https://yts.mx");
        assert_eq!(config.providers.tpb.cache_age_secs, 86_400);
        assert_eq!(config.providers.rarbg.min_interval_ms, 2000);
        assert_eq!(config.providers.rarbg.token_ttl_secs, 840);
        assert_eq!(config.providers.rarbg.app_id, "magnetar");
        assert_eq!(config.cinemeta.base_url, "https://v3-cinemeta.strem.io");
    }

    #[test]
    fn test_deserialize_provider_section() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[providers.rarbg]
base_url = "http://localhost:9999"
timeout_secs = 2
min_interval_ms = 100

[providers.yts]
enabled = false
base_url = "https://yts.example"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);

        let rarbg = &config.providers.rarbg;
        assert_eq!(rarbg.base_url, "http://localhost:9999");
        assert_eq!(rarbg.timeout_secs, 2);
        assert!(rarbg.enabled);
        assert_eq!(rarbg.cache_age_secs, 86_400);
        assert_eq!(rarbg.min_interval_ms, 100);
        assert_eq!(rarbg.token_ttl_secs, 840);

        assert!(!config.providers.yts.enabled);
        // Untouched sections keep their defaults
        assert_eq!(config.providers.tpb.base_url, "https://apibay.org");
    }

    #[test]
    fn test_deserialize_partial_provider_section() {
        let toml = r#"
[providers.tpb]
enabled = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.providers.tpb.enabled);
        assert_eq!(config.providers.tpb.base_url, "https://apibay.org");
        assert_eq!(config.providers.tpb.timeout_secs, 5);
    }

    #[test]
    fn test_sanitized_config_lists_providers_in_order() {
        let mut config = Config::default();
        config.providers.tpb.enabled = false;

        let sanitized = SanitizedConfig::from(&config);
        let names: Vec<_> = sanitized.providers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["yts", "tpb", "rarbg"]);
        assert!(!sanitized.providers[1].enabled);
        assert_eq!(sanitized.server.port, 8080);
    }
}
