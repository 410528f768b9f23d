//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock providers injected, so the HTTP layer can be tested without
//! any upstream torrent site.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use magnetar_core::{testing::MockProvider, Aggregator, Config, TorrentProvider};
use magnetar_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use magnetar_core::testing::fixtures;

/// Test fixture for E2E testing with mock providers.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_movie_search() {
///     let yts = MockProvider::new("yts").with_results(vec![..]);
///     let fixture = TestFixture::with_providers(vec![yts]);
///
///     let response = fixture.get("/api/v1/torrents/movie/tt0133093").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The providers behind the aggregator, in query order
    pub providers: Vec<Arc<MockProvider>>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// Parsed JSON body, or `Null` if the body isn't JSON.
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a fixture with a single provider that finds nothing.
    pub fn new() -> Self {
        Self::with_providers(vec![MockProvider::new("mock")])
    }

    /// Create a fixture over the given providers with a generous timeout.
    pub fn with_providers(providers: Vec<MockProvider>) -> Self {
        Self::with_timeout(providers, Duration::from_secs(5))
    }

    /// Create a fixture over the given providers and per-provider timeout.
    pub fn with_timeout(providers: Vec<MockProvider>, timeout: Duration) -> Self {
        let providers: Vec<Arc<MockProvider>> = providers.into_iter().map(Arc::new).collect();
        let dyn_providers = providers
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn TorrentProvider>)
            .collect();

        let aggregator = Arc::new(Aggregator::new(dyn_providers, timeout));
        let state = Arc::new(AppState::new(Config::default(), aggregator));

        Self {
            router: create_router(state),
            providers,
        }
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
