use std::sync::Arc;

use async_trait::async_trait;

use super::health::BreakerState;
use crate::error::CacheError;

/// 键值存储能力，Redis 与进程内存两种实现
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// 写入并设置过期时间（秒）
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// 自增，不改变已有的过期时间
    async fn incr(&self, key: &str) -> Result<i64, CacheError>;

    async fn del(&self, key: &str) -> Result<(), CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;

    fn backend_name(&self) -> &'static str;

    fn breaker_state(&self) -> BreakerState {
        BreakerState::Closed
    }

    /// 运维触发的重连信号，默认只做一次探活
    async fn reconnect(&self) -> Result<(), CacheError> {
        self.ping().await
    }
}

pub type SharedStore = Arc<dyn Store>;
