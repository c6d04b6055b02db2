use std::time::Duration;

use async_trait::async_trait;

/// Pause between two sources of a crawl pass.
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn pause(&self);
}

/// Fixed-rate throttle backed by `tokio::time::sleep`.
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Throttle for FixedDelay {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[tokio::test]
    async fn sleeps_for_the_configured_delay() {
        let throttle = FixedDelay::new(Duration::from_millis(50));
        let started = Instant::now();
        throttle.pause().await;
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn zero_delay_returns_immediately() {
        let started = Instant::now();
        FixedDelay::new(Duration::ZERO).pause().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
