//! Request pacing.
//!
//! Enforces a fixed minimum interval between dispatched requests. The
//! interval is measured from one dispatch to the next, so slow responses do
//! not shorten the gap and pipelined callers still queue behind each other.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Default)]
struct PacerState {
    last_dispatch: Option<Instant>,
    total_requests: u64,
}

/// Shared pacing gate. Clones share state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    state: Arc<Mutex<PacerState>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            state: Arc::new(Mutex::new(PacerState::default())),
        }
    }

    /// Wait until a request may be dispatched, then record the dispatch.
    ///
    /// Returns how long the caller waited. The first request never waits.
    pub async fn acquire(&self) -> Duration {
        // Held across the sleep so concurrent callers dispatch one at a time.
        let mut state = self.state.lock().await;

        let wait = state
            .last_dispatch
            .map(|last| (last + self.min_interval).saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO);

        if wait > Duration::ZERO {
            debug!("Pacing: waiting {:?} before next request", wait);
            tokio::time::sleep(wait).await;
        }

        state.last_dispatch = Some(Instant::now());
        state.total_requests += 1;
        wait
    }

    /// Requests dispatched through this limiter.
    pub async fn total_requests(&self) -> u64 {
        self.state.lock().await.total_requests
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_millis(1500));
        assert_eq!(limiter.acquire().await, Duration::ZERO);
        assert_eq!(limiter.total_requests().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_between_dispatches() {
        let limiter = RateLimiter::new(Duration::from_millis(1500));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_millis(3000));
        assert_eq!(limiter.total_requests().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_work_counts_toward_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(1500));
        limiter.acquire().await;

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let waited = limiter.acquire().await;
        assert!(waited <= Duration::from_millis(500));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(limiter.acquire().await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_state() {
        let limiter = RateLimiter::new(Duration::from_secs(2));
        let other = limiter.clone();
        let start = Instant::now();

        let a = tokio::spawn({
            let l = limiter.clone();
            async move { l.acquire().await }
        });
        let b = tokio::spawn(async move { other.acquire().await });
        let _ = a.await.unwrap();
        let _ = b.await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(limiter.total_requests().await, 2);
    }
}
