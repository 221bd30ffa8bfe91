use rand::{thread_rng, Rng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::{sleep, Instant};

/// Token bucket for new connections, refilled once per second.
#[derive(Clone)]
pub struct RateLimiter {
    tokens: Arc<Semaphore>,
    per_second: u32,
    last_refill: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    pub fn new(per_second: u32) -> Self {
        Self {
            tokens: Arc::new(Semaphore::new(per_second as usize)),
            per_second,
            last_refill: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub async fn acquire(&self) {
        loop {
            self.refill().await;
            if let Ok(permit) = self.tokens.try_acquire() {
                permit.forget();
                return;
            }
            sleep(Duration::from_millis(50)).await;
        }
    }

    async fn refill(&self) {
        let mut last = self.last_refill.lock().await;
        let now = Instant::now();
        if now.duration_since(*last) >= Duration::from_secs(1) {
            let missing = self
                .per_second
                .saturating_sub(self.tokens.available_permits() as u32);
            if missing > 0 {
                self.tokens.add_permits(missing as usize);
            }
            *last = now;
        }
    }

    /// Spreads connection attempts so a burst does not land in one instant.
    pub async fn sleep_jitter(&self) {
        let jitter_ms: u64 = thread_rng().gen_range(5..20);
        sleep(Duration::from_millis(jitter_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn bucket_refills_after_a_second() {
        let limiter = RateLimiter::new(2);
        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(limiter.tokens.available_permits(), 0);

        let started = Instant::now();
        limiter.acquire().await;
        assert!(started.elapsed() >= Duration::from_secs(1) - Duration::from_millis(50));
        assert_eq!(limiter.tokens.available_permits(), 1);
    }
}
