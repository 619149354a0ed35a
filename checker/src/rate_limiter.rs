use std::sync::Arc;
use tokio::time::Duration;

use leaky_bucket::RateLimiter;

/// Paces remote calls: a single permit refilled once per interval. The first
/// acquire returns immediately; each later acquire waits out the remainder of
/// the interval, so there is no trailing delay after the last call of a run.
#[derive(Clone)]
pub struct RequestPacer {
    chunk: Arc<RateLimiter>,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        let chunk = RateLimiter::builder()
            .initial(1)
            .interval(interval)
            .max(1)
            .refill(1)
            .build();

        Self {
            chunk: Arc::new(chunk),
        }
    }

    pub async fn acquire_one(&self) {
        self.chunk.acquire_one().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let pacer = RequestPacer::new(Duration::from_millis(200));

        let start = Instant::now();
        pacer.acquire_one().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_successive_acquires_are_spaced() {
        let pacer = RequestPacer::new(Duration::from_millis(50));

        let start = Instant::now();
        pacer.acquire_one().await;
        pacer.acquire_one().await;
        pacer.acquire_one().await;

        // Two refill waits after the free initial permit.
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
