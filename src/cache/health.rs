use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

/// 熔断器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// 存储连接熔断器
///
/// 失败后在 `recheck_interval` 内拒绝所有操作，到期后放行一次试探，
/// 试探成功则恢复。
#[derive(Debug)]
pub struct CircuitBreaker {
    open_until: Mutex<Option<Instant>>,
    recheck_interval: Duration,
}

impl CircuitBreaker {
    pub fn new(recheck_interval: Duration) -> Self {
        Self {
            open_until: Mutex::new(None),
            recheck_interval,
        }
    }

    pub fn state(&self) -> BreakerState {
        match *self.lock() {
            None => BreakerState::Closed,
            Some(until) if Instant::now() >= until => BreakerState::HalfOpen,
            Some(_) => BreakerState::Open,
        }
    }

    pub fn allow(&self) -> bool {
        self.state() != BreakerState::Open
    }

    pub fn record_success(&self) {
        let mut guard = self.lock();
        if guard.take().is_some() {
            tracing::info!("Cache store recovered, circuit closed");
        }
    }

    pub fn record_failure(&self) {
        let mut guard = self.lock();
        if guard.is_none() {
            tracing::warn!(
                "Cache store unavailable, circuit open for {}s",
                self.recheck_interval.as_secs()
            );
        }
        *guard = Some(Instant::now() + self.recheck_interval);
    }

    /// 立即允许下一次试探
    pub fn force_recheck(&self) {
        let mut guard = self.lock();
        if guard.is_some() {
            *guard = Some(Instant::now());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.open_until.lock().unwrap_or_else(|e| e.into_inner())
    }
}
