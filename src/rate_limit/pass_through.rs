use async_trait::async_trait;

use super::{RateLimitUsage, RateLimiter};

/// 未配置存储时的限流器，总是放行
#[derive(Debug, Clone)]
pub struct PassThroughRateLimiter {
    max_requests: u32,
    window_minutes: u64,
}

impl PassThroughRateLimiter {
    pub fn new(max_requests: u32, window_minutes: u64) -> Self {
        Self {
            max_requests,
            window_minutes,
        }
    }
}

#[async_trait]
impl RateLimiter for PassThroughRateLimiter {
    async fn check_limit(&self) -> bool {
        true
    }

    async fn increment_counter(&self) {}

    async fn get_usage(&self) -> RateLimitUsage {
        RateLimitUsage {
            current: 0,
            max: self.max_requests,
            window_minutes: self.window_minutes,
        }
    }

    async fn reset(&self) {}

    fn kind(&self) -> &'static str {
        "pass_through"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_allows() {
        let limiter = PassThroughRateLimiter::new(1, 5);
        for _ in 0..10 {
            assert!(limiter.check_limit().await);
            limiter.increment_counter().await;
        }
        assert_eq!(limiter.get_usage().await.current, 0);
    }
}
