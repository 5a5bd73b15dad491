// 缓存模块
// 可选的键值存储：Redis 或进程内存，均实现 Store trait

pub mod health;
pub mod keys;
pub mod memory;
pub mod operations;
pub mod redis_store;
pub mod store;

pub use health::{BreakerState, CircuitBreaker};
pub use memory::MemoryStore;
pub use operations::JsonCacheOperations;
pub use redis_store::RedisStore;
pub use store::{SharedStore, Store};

use std::sync::Arc;

use crate::config::{CacheBackend, Config};
use crate::error::CacheError;

/// 按配置创建存储，`none` 时返回 None
pub fn store_for(config: &Config) -> Result<Option<SharedStore>, CacheError> {
    Ok(match config.cache_backend {
        CacheBackend::Redis => Some(Arc::new(RedisStore::from_config(config)?)),
        CacheBackend::Memory => Some(Arc::new(MemoryStore::new())),
        CacheBackend::None => None,
    })
}
