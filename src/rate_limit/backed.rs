use async_trait::async_trait;

use super::{RateLimitUsage, RateLimiter};
use crate::cache::SharedStore;
use crate::cache::keys::RATE_LIMIT_KEY;

/// 基于存储计数器的固定窗口限流器
///
/// 存储不可用时放行：`check_limit` 返回 true，其余操作什么都不做，
/// `get_usage` 的 current 为 0。
pub struct BackedRateLimiter {
    store: SharedStore,
    key: &'static str,
    max_requests: u32,
    window_minutes: u64,
}

impl BackedRateLimiter {
    pub fn new(store: SharedStore, max_requests: u32, window_minutes: u64) -> Self {
        Self {
            store,
            key: RATE_LIMIT_KEY,
            max_requests,
            window_minutes: window_minutes.max(1),
        }
    }

    fn window_secs(&self) -> u64 {
        self.window_minutes.saturating_mul(60)
    }

    async fn current_count(&self) -> Option<u64> {
        match self.store.get(self.key).await {
            Ok(value) => Some(value.and_then(|v| v.parse().ok()).unwrap_or(0)),
            Err(e) => {
                tracing::warn!("Rate limit store unavailable, failing open: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl RateLimiter for BackedRateLimiter {
    async fn check_limit(&self) -> bool {
        match self.current_count().await {
            Some(count) => count < u64::from(self.max_requests),
            None => true,
        }
    }

    async fn increment_counter(&self) {
        let result = match self.store.exists(self.key).await {
            // 第一次计数时设置窗口过期时间
            Ok(false) => self.store.set_ex(self.key, "1", self.window_secs()).await,
            Ok(true) => self.store.incr(self.key).await.map(|_| ()),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!("Failed to increment rate limit counter: {}", e);
        }
    }

    async fn get_usage(&self) -> RateLimitUsage {
        RateLimitUsage {
            current: self.current_count().await.unwrap_or(0),
            max: self.max_requests,
            window_minutes: self.window_minutes,
        }
    }

    async fn reset(&self) {
        if let Err(e) = self.store.del(self.key).await {
            tracing::warn!("Failed to reset rate limit counter: {}", e);
        }
    }

    fn kind(&self) -> &'static str {
        "backed"
    }
}
