//! Request spacing and token reuse for rate-limited upstreams.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::torrent::ProviderError;

#[derive(Debug, Default)]
struct GateState {
    token: Option<String>,
    token_expires_at: Option<Instant>,
    last_request_at: Option<Instant>,
}

impl GateState {
    fn valid_token(&self, now: Instant) -> Option<&str> {
        match (&self.token, self.token_expires_at) {
            (Some(token), Some(expires_at)) if now < expires_at => Some(token),
            _ => None,
        }
    }
}

/// Serializes access to an upstream that wants requests spaced out and
/// authenticated with a short-lived token.
///
/// One lock guards the token, its expiry and the time of the last request,
/// so concurrent lookups on the same provider queue up behind each other.
/// Dropping an `acquire_slot` future releases the lock.
#[derive(Debug)]
pub struct RequestGate {
    state: Mutex<GateState>,
    min_interval: Duration,
    token_ttl: Duration,
}

impl RequestGate {
    pub fn new(min_interval: Duration, token_ttl: Duration) -> Self {
        Self {
            state: Mutex::new(GateState::default()),
            min_interval,
            token_ttl,
        }
    }

    /// Wait for a request slot and return a usable token.
    ///
    /// If no token is cached or it has expired, `fetch_token` runs first as
    /// its own spaced request. The caller's request counts as sent when this
    /// returns.
    pub async fn acquire_slot<F, Fut>(&self, fetch_token: F) -> Result<String, ProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, ProviderError>>,
    {
        let mut state = self.state.lock().await;

        if state.valid_token(Instant::now()).is_none() {
            self.wait_turn(&state).await;
            let fetched = fetch_token().await;
            let now = Instant::now();
            state.last_request_at = Some(now);

            let token = fetched.map_err(|e| match e {
                ProviderError::Token(_) => e,
                other => ProviderError::Token(other.to_string()),
            })?;
            if token.is_empty() {
                return Err(ProviderError::Token("token is empty".to_string()));
            }

            debug!(ttl_secs = self.token_ttl.as_secs(), "Refreshed upstream token");
            state.token = Some(token);
            state.token_expires_at = Some(now + self.token_ttl);
        }

        self.wait_turn(&state).await;
        let now = Instant::now();
        state.last_request_at = Some(now);

        state
            .valid_token(now)
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Token("token expired while waiting".to_string()))
    }

    /// Forget the cached token, e.g. after the upstream rejected it.
    pub async fn invalidate_token(&self) {
        let mut state = self.state.lock().await;
        state.token = None;
        state.token_expires_at = None;
    }

    async fn wait_turn(&self, state: &GateState) {
        if let Some(last) = state.last_request_at {
            let ready_at = last + self.min_interval;
            if ready_at > Instant::now() {
                debug!(
                    wait_ms = (ready_at - Instant::now()).as_millis() as u64,
                    "Waiting for request slot"
                );
                sleep_until(ready_at).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn gate() -> RequestGate {
        RequestGate::new(Duration::from_secs(2), Duration::from_secs(14 * 60))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_slot_fetches_token_then_waits() {
        let gate = gate();
        let start = Instant::now();

        let token = gate
            .acquire_slot(|| async { Ok("abc".to_string()) })
            .await
            .unwrap();

        assert_eq!(token, "abc");
        // The token request and the actual request are spaced out
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_is_reused_until_expiry() {
        let gate = gate();
        let counter = AtomicUsize::new(0);
        let fetches = &counter;
        let fetch = move || async move {
            let n = fetches.fetch_add(1, Ordering::SeqCst);
            Ok(format!("token-{}", n))
        };

        assert_eq!(gate.acquire_slot(fetch).await.unwrap(), "token-0");
        assert_eq!(gate.acquire_slot(fetch).await.unwrap(), "token-0");
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(15 * 60)).await;

        assert_eq!(gate.acquire_slot(fetch).await.unwrap(), "token-1");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_are_spaced_by_min_interval() {
        let gate = Arc::new(gate());
        gate.acquire_slot(|| async { Ok("t".to_string()) })
            .await
            .unwrap();

        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..3 {
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move {
                gate.acquire_slot(|| async { Ok("unused".to_string()) })
                    .await
                    .unwrap();
                Instant::now()
            }));
        }

        let mut finished = Vec::new();
        for handle in handles {
            finished.push(handle.await.unwrap());
        }
        finished.sort();

        assert!(finished[0] - start >= Duration::from_secs(2));
        for pair in finished.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(2));
        }
        assert!(finished[2] - start < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_is_token_error() {
        let gate = gate();

        let err = gate
            .acquire_slot(|| async { Err(ProviderError::Status { status: 503 }) })
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Token(_)));
        assert_eq!(err.to_string(), "couldn't refresh token: bad GET response: 503");

        let err = gate
            .acquire_slot(|| async { Ok(String::new()) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "couldn't refresh token: token is empty");
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_refresh() {
        let gate = gate();
        gate.acquire_slot(|| async { Ok("old".to_string()) })
            .await
            .unwrap();
        gate.invalidate_token().await;

        let token = gate
            .acquire_slot(|| async { Ok("new".to_string()) })
            .await
            .unwrap();
        assert_eq!(token, "new");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_waiter_releases_lock() {
        let gate = gate();
        gate.acquire_slot(|| async { Ok("t".to_string()) })
            .await
            .unwrap();

        // Gives up while waiting for its slot
        let abandoned = tokio::time::timeout(
            Duration::from_millis(100),
            gate.acquire_slot(|| async { Ok("t".to_string()) }),
        )
        .await;
        assert!(abandoned.is_err());

        let token = tokio::time::timeout(
            Duration::from_secs(5),
            gate.acquire_slot(|| async { Ok("t".to_string()) }),
        )
        .await;
        assert!(token.is_ok());
    }
}
