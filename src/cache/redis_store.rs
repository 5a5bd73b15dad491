use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, RedisError, RedisResult, aio::MultiplexedConnection};
use tokio::sync::Mutex;
use tokio::time::{error::Elapsed, timeout};

use super::health::{BreakerState, CircuitBreaker};
use super::store::Store;
use crate::config::Config;
use crate::error::CacheError;

/// Redis 存储
///
/// 复用一个 multiplexed 连接。连接或命令失败时熔断器打开，
/// 在重试间隔内所有操作直接返回 `CacheError::Unavailable`。
pub struct RedisStore {
    client: RedisClient,
    connection: Mutex<Option<MultiplexedConnection>>,
    breaker: CircuitBreaker,
    op_timeout: Duration,
    connect_retries: u32,
}

impl RedisStore {
    pub fn new(
        client: RedisClient,
        op_timeout: Duration,
        connect_retries: u32,
        recheck_interval: Duration,
    ) -> Self {
        Self {
            client,
            connection: Mutex::new(None),
            breaker: CircuitBreaker::new(recheck_interval),
            op_timeout,
            connect_retries: connect_retries.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, CacheError> {
        let url = config.redis_url.as_deref().ok_or(CacheError::Unavailable)?;
        let client = RedisClient::open(url)?;
        Ok(Self::new(
            client,
            config.redis_connect_timeout(),
            config.redis_connect_retries,
            config.redis_recheck_interval(),
        ))
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        if !self.breaker.allow() {
            return Err(CacheError::Unavailable);
        }

        let mut guard = self.connection.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let mut last_err = CacheError::Unavailable;
        for attempt in 1..=self.connect_retries {
            match timeout(self.op_timeout, self.client.get_multiplexed_async_connection()).await {
                Ok(Ok(conn)) => {
                    tracing::debug!("Connected to redis on attempt {}", attempt);
                    *guard = Some(conn.clone());
                    return Ok(conn);
                }
                Ok(Err(e)) => {
                    tracing::warn!("Redis connect attempt {} failed: {}", attempt, e);
                    last_err = CacheError::Redis(e);
                }
                Err(_) => {
                    tracing::warn!("Redis connect attempt {} timed out", attempt);
                    last_err = CacheError::Timeout;
                }
            }
        }

        self.breaker.record_failure();
        Err(last_err)
    }

    async fn settle<T>(&self, result: Result<RedisResult<T>, Elapsed>) -> Result<T, CacheError> {
        let err = match result {
            Ok(Ok(value)) => {
                self.breaker.record_success();
                return Ok(value);
            }
            // 服务端回复的错误说明连接正常，不影响熔断器
            Ok(Err(e)) if !is_connectivity_error(&e) => {
                tracing::warn!("Redis command rejected: {}", e);
                self.breaker.record_success();
                return Err(CacheError::Redis(e));
            }
            Ok(Err(e)) => CacheError::Redis(e),
            Err(_) => CacheError::Timeout,
        };

        tracing::warn!("Redis operation failed: {}", err);
        self.connection.lock().await.take();
        self.breaker.record_failure();
        Err(err)
    }
}

/// 只有连接层面的错误才需要断开连接并打开熔断器
fn is_connectivity_error(e: &RedisError) -> bool {
    e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let result = timeout(self.op_timeout, conn.get::<_, Option<String>>(key)).await;
        self.settle(result).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let result = timeout(self.op_timeout, conn.set_ex::<_, _, ()>(key, value, ttl_secs)).await;
        self.settle(result).await
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        let result = timeout(self.op_timeout, conn.exists::<_, bool>(key)).await;
        self.settle(result).await
    }

    async fn incr(&self, key: &str) -> Result<i64, CacheError> {
        let mut conn = self.connection().await?;
        let result = timeout(self.op_timeout, conn.incr::<_, _, i64>(key, 1)).await;
        self.settle(result).await
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let result = timeout(self.op_timeout, conn.del::<_, ()>(key)).await;
        self.settle(result).await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let cmd = redis::cmd("PING");
        let result: Result<RedisResult<String>, Elapsed> =
            timeout(self.op_timeout, cmd.query_async(&mut conn)).await;
        self.settle(result).await.map(|_| ())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }

    fn breaker_state(&self) -> BreakerState {
        self.breaker.state()
    }

    /// 丢弃旧连接并立即允许试探
    async fn reconnect(&self) -> Result<(), CacheError> {
        self.connection.lock().await.take();
        self.breaker.force_recheck();
        self.ping().await
    }
}
