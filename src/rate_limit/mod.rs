// 上游调用限流
// 两种实现：基于存储的计数器，以及不做任何限制的直通实现

mod backed;
mod pass_through;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use backed::BackedRateLimiter;
pub use pass_through::PassThroughRateLimiter;

use crate::cache::SharedStore;
use crate::config::Config;

/// 当前窗口内的使用情况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitUsage {
    pub current: u64,
    pub max: u32,
    #[serde(rename = "windowMinutes")]
    pub window_minutes: u64,
}

/// 限流器
///
/// 调用方先 `check_limit` 再 `increment_counter`，两步之间不保证原子性，
/// 并发请求可能略微超出上限。
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn check_limit(&self) -> bool;

    async fn increment_counter(&self);

    async fn get_usage(&self) -> RateLimitUsage;

    async fn reset(&self);

    fn kind(&self) -> &'static str;
}

pub type SharedRateLimiter = Arc<dyn RateLimiter>;

/// 有存储时使用计数器，否则直通
pub fn rate_limiter_for(store: Option<SharedStore>, config: &Config) -> SharedRateLimiter {
    match store {
        Some(store) => Arc::new(BackedRateLimiter::new(
            store,
            config.rate_limit_requests,
            config.rate_limit_window_minutes,
        )),
        None => Arc::new(PassThroughRateLimiter::new(
            config.rate_limit_requests,
            config.rate_limit_window_minutes,
        )),
    }
}
