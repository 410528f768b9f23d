//! Mock torrent provider for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::torrent::{MediaQuery, ProviderError, TorrentProvider, TorrentResult};

/// Mock implementation of the TorrentProvider trait.
///
/// Provides scripted behavior for testing:
/// - Return configurable results (separately for movies and episodes)
/// - Fail every call, or only the next one
/// - Delay each answer, or never answer at all
/// - Record queries for assertions
///
/// # Example
///
/// ```rust,ignore
/// use magnetar_core::testing::{MockProvider, fixtures};
///
/// let slow = MockProvider::new("slow")
///     .with_results(vec![fixtures::torrent_result("Movie", HASH)])
///     .with_delay(Duration::from_secs(30));
/// let broken = MockProvider::new("broken").with_error_message("HTTP 500");
/// ```
pub struct MockProvider {
    name: String,
    movie_results: RwLock<Vec<TorrentResult>>,
    episode_results: RwLock<Vec<TorrentResult>>,
    /// If set, every call fails with this message.
    error_message: RwLock<Option<String>>,
    /// If set, the next call fails with this error.
    next_error: RwLock<Option<ProviderError>>,
    delay: RwLock<Option<Duration>>,
    hang: bool,
    calls: RwLock<Vec<MediaQuery>>,
    /// Calls that ran to completion (not cancelled).
    completed: AtomicUsize,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("name", &self.name)
            .field("hang", &self.hang)
            .finish_non_exhaustive()
    }
}

impl MockProvider {
    /// Create a mock provider that answers every query with no results.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            movie_results: RwLock::new(Vec::new()),
            episode_results: RwLock::new(Vec::new()),
            error_message: RwLock::new(None),
            next_error: RwLock::new(None),
            delay: RwLock::new(None),
            hang: false,
            calls: RwLock::new(Vec::new()),
            completed: AtomicUsize::new(0),
        }
    }

    /// Answer both movie and episode queries with `results`.
    pub fn with_results(mut self, results: Vec<TorrentResult>) -> Self {
        *self.episode_results.get_mut() = results.clone();
        *self.movie_results.get_mut() = results;
        self
    }

    /// Answer episode queries with `results`.
    pub fn with_episode_results(mut self, results: Vec<TorrentResult>) -> Self {
        *self.episode_results.get_mut() = results;
        self
    }

    /// Fail every call with `ProviderError::Other(message)`.
    pub fn with_error_message(mut self, message: &str) -> Self {
        *self.error_message.get_mut() = Some(message.to_string());
        self
    }

    /// Wait `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        *self.delay.get_mut() = Some(delay);
        self
    }

    /// Never answer.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Set the results to return for subsequent queries.
    pub async fn set_results(&self, results: Vec<TorrentResult>) {
        *self.episode_results.write().await = results.clone();
        *self.movie_results.write().await = results;
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: ProviderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set or clear the per-call delay.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    /// Queries received so far, in arrival order.
    pub async fn recorded_calls(&self) -> Vec<MediaQuery> {
        self.calls.read().await.clone()
    }

    /// Number of queries received.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Number of calls that returned, as opposed to being dropped midway.
    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    async fn answer(&self, query: MediaQuery) -> Result<Vec<TorrentResult>, ProviderError> {
        self.calls.write().await.push(query.clone());

        if self.hang {
            std::future::pending::<()>().await;
        }

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.completed.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if let Some(message) = self.error_message.read().await.clone() {
            return Err(ProviderError::Other(message));
        }

        let results = match query {
            MediaQuery::Movie { .. } => self.movie_results.read().await.clone(),
            MediaQuery::Episode { .. } => self.episode_results.read().await.clone(),
        };
        Ok(results)
    }
}

#[async_trait]
impl TorrentProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_movie(&self, id: &str) -> Result<Vec<TorrentResult>, ProviderError> {
        self.answer(MediaQuery::movie(id)).await
    }

    async fn find_episode(
        &self,
        id: &str,
        title: &str,
    ) -> Result<Vec<TorrentResult>, ProviderError> {
        self.answer(MediaQuery::episode(id, title)).await
    }
}
