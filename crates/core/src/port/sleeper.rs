// Sleeper Port - backoff waits between retries

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the caller for a backoff delay (allows recording in tests)
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Tokio timer (production)
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
