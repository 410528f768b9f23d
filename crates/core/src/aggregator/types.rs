//! Types for aggregated queries.

use serde::Serialize;
use thiserror::Error;

use crate::torrent::{ProviderError, TorrentResult};

/// What a single provider produced within one aggregated query.
#[derive(Debug)]
pub enum ProviderOutcome {
    /// The provider answered in time (possibly with an empty list).
    Succeeded(Vec<TorrentResult>),
    /// The provider reported a failure.
    Failed(ProviderError),
    /// The provider did not answer within the per-provider timeout.
    TimedOut,
}

impl ProviderOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ProviderOutcome::Succeeded(_) => "succeeded",
            ProviderOutcome::Failed(_) => "failed",
            ProviderOutcome::TimedOut => "timed_out",
        }
    }
}

/// Summary of one provider's part in an aggregated query.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderReport {
    pub provider: String,
    /// "succeeded", "failed" or "timed_out".
    pub outcome: &'static str,
    /// Results contributed before dedup.
    pub results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Bookkeeping for one aggregated query.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregationOutcome {
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
    /// Providers that contributed at least one result.
    pub contributors: usize,
    /// Whether the merged list went through dedup.
    pub deduplicated: bool,
    /// Per-provider reports, in provider order.
    pub providers: Vec<ProviderReport>,
}

/// A provider failure, kept for the combined error.
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: ProviderError,
}

/// Errors from an aggregated query.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Every configured provider failed (timeouts don't count as failures).
    #[error("couldn't find torrents on any site: {}", format_failures(.0))]
    AllProvidersFailed(Vec<ProviderFailure>),
}

impl AggregateError {
    /// The individual provider failures, in provider order.
    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            AggregateError::AllProvidersFailed(failures) => failures,
        }
    }
}

fn format_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{}.: {}", i + 1, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}
