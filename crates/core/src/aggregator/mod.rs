//! Fan-out/fan-in aggregation across torrent providers.
//!
//! Every query is sent to all providers at once, each raced against the same
//! per-provider timeout. A slow provider contributes nothing; a failing one
//! is ignored unless every provider fails.

mod types;

pub use types::*;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::AggregatorConfig;
use crate::metrics::{PROVIDER_OUTCOMES, QUERY_DURATION, QUERY_RESULTS};
use crate::torrent::{dedup_by_info_hash, MediaQuery, ProviderError, TorrentProvider, TorrentResult};

/// Queries a fixed set of providers concurrently and merges their answers.
pub struct Aggregator {
    providers: Vec<Arc<dyn TorrentProvider>>,
    timeout: Duration,
}

impl Aggregator {
    /// Create an aggregator over `providers` (order decides dedup precedence).
    pub fn new(providers: Vec<Arc<dyn TorrentProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    pub fn from_config(providers: Vec<Arc<dyn TorrentProvider>>, config: &AggregatorConfig) -> Self {
        Self::new(providers, Duration::from_millis(config.timeout_ms))
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Find torrents for a movie across all providers.
    pub async fn find_movie(&self, id: &str) -> Result<Vec<TorrentResult>, AggregateError> {
        self.query(&MediaQuery::movie(id)).await
    }

    /// Find torrents for an episode across all providers.
    pub async fn find_episode(
        &self,
        id: &str,
        title: &str,
    ) -> Result<Vec<TorrentResult>, AggregateError> {
        self.query(&MediaQuery::episode(id, title)).await
    }

    /// Run an aggregated query.
    ///
    /// Fails only when every provider failed. Timed-out providers count as
    /// empty successes.
    pub async fn query(&self, query: &MediaQuery) -> Result<Vec<TorrentResult>, AggregateError> {
        self.query_detailed(query).await.map(|(results, _)| results)
    }

    /// Like `query`, but also returns per-provider bookkeeping.
    pub async fn query_detailed(
        &self,
        query: &MediaQuery,
    ) -> Result<(Vec<TorrentResult>, AggregationOutcome), AggregateError> {
        let start = Instant::now();
        let kind = query.kind();

        debug!(
            kind = %kind,
            id = %query.id(),
            providers = self.providers.len(),
            "Starting aggregated query"
        );

        let outcomes = self.dispatch(query).await;
        let merged = merge_outcomes(outcomes);

        QUERY_DURATION
            .with_label_values(&[kind.as_str()])
            .observe(start.elapsed().as_secs_f64());

        match &merged {
            Ok((results, outcome)) => {
                QUERY_RESULTS
                    .with_label_values(&[kind.as_str()])
                    .observe(results.len() as f64);
                debug!(
                    results = results.len(),
                    succeeded = outcome.succeeded,
                    failed = outcome.failed,
                    timed_out = outcome.timed_out,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Aggregated query complete"
                );
            }
            Err(e) => warn!(error = %e, "All providers failed"),
        }

        merged
    }

    /// Spawn one task per provider and wait for every one of them.
    ///
    /// Outcomes come back in provider order regardless of completion order.
    async fn dispatch(&self, query: &MediaQuery) -> Vec<(String, ProviderOutcome)> {
        let mut tasks = AbortOnDrop(Vec::with_capacity(self.providers.len()));

        for provider in &self.providers {
            let provider = Arc::clone(provider);
            let query = query.clone();
            let timeout = self.timeout;
            tasks.0.push(tokio::spawn(async move {
                // Dropping the lookup on timeout cancels it.
                match tokio::time::timeout(timeout, provider.find(&query)).await {
                    Ok(Ok(results)) => ProviderOutcome::Succeeded(results),
                    Ok(Err(e)) => ProviderOutcome::Failed(e),
                    Err(_) => ProviderOutcome::TimedOut,
                }
            }));
        }

        let mut outcomes = Vec::with_capacity(self.providers.len());
        for (provider, handle) in self.providers.iter().zip(tasks.0.iter_mut()) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => ProviderOutcome::Failed(ProviderError::Cancelled),
                Err(e) => ProviderOutcome::Failed(ProviderError::Other(format!(
                    "provider task panicked: {}",
                    e
                ))),
            };
            debug!(provider = provider.name(), outcome = outcome.label(), "Provider finished");
            outcomes.push((provider.name().to_string(), outcome));
        }

        outcomes
    }
}

/// Aborts provider tasks still in flight when the query is dropped.
struct AbortOnDrop(Vec<JoinHandle<ProviderOutcome>>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Apply the failure policy, merge in provider order and dedup if needed.
fn merge_outcomes(
    outcomes: Vec<(String, ProviderOutcome)>,
) -> Result<(Vec<TorrentResult>, AggregationOutcome), AggregateError> {
    let total = outcomes.len();
    let mut summary = AggregationOutcome::default();
    let mut merged: Vec<TorrentResult> = Vec::new();
    let mut failures: Vec<ProviderFailure> = Vec::new();

    for (provider, outcome) in outcomes {
        let mut report = ProviderReport {
            provider: provider.clone(),
            outcome: outcome.label(),
            results: 0,
            error: None,
        };

        let contributed = match outcome {
            ProviderOutcome::Succeeded(results) => Some(results),
            ProviderOutcome::Failed(ProviderError::Cache { results, source }) => {
                warn!(provider = %provider, error = %source, "Failed to cache provider results");
                report.outcome = "succeeded";
                Some(results)
            }
            ProviderOutcome::Failed(error) => {
                debug!(provider = %provider, error = %error, "Provider failed");
                report.error = Some(error.to_string());
                failures.push(ProviderFailure { provider, error });
                summary.failed += 1;
                None
            }
            ProviderOutcome::TimedOut => {
                debug!(provider = %provider, "Provider timed out");
                summary.timed_out += 1;
                None
            }
        };

        if let Some(mut results) = contributed {
            summary.succeeded += 1;
            report.results = results.len();
            if !results.is_empty() {
                summary.contributors += 1;
            }
            merged.append(&mut results);
        }

        // Recorded after reclassification so a cache write error counts as success
        PROVIDER_OUTCOMES
            .with_label_values(&[report.provider.as_str(), report.outcome])
            .inc();
        summary.providers.push(report);
    }

    if total > 0 && summary.failed == total {
        return Err(AggregateError::AllProvidersFailed(failures));
    }

    // A single contributor can't produce cross-provider duplicates.
    if summary.contributors > 1 {
        merged = dedup_by_info_hash(merged);
        summary.deduplicated = true;
    }

    Ok((merged, summary))
}
