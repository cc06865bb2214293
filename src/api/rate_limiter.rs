use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Fixed-interval gate for outbound requests. The first request passes
/// immediately, every later one waits until a full period has elapsed
/// since the previous request was let through.
#[derive(Debug)]
pub struct RateLimiter {
    period: Duration,
    next_slot: Option<Instant>
}

impl RateLimiter {
    pub fn new(period: Duration) -> Self {
        RateLimiter { period, next_slot: None }
    }

    /// Limiter admitting at most `requests_per_second` requests per second.
    /// Non-positive rates disable limiting.
    pub fn per_second(requests_per_second: f64) -> Self {
        if requests_per_second > 0.0 && requests_per_second.is_finite() {
            Self::new(Duration::from_secs_f64(1.0 / requests_per_second))
        } else {
            Self::new(Duration::ZERO)
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub async fn acquire(&mut self) {
        if let Some(slot) = self.next_slot {
            sleep_until(slot).await;
        }

        self.next_slot = Some(Instant::now() + self.period);
    }
}
