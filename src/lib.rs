use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use cache::{BreakerState, SharedStore};
use config::Config;
use rate_limit::{RateLimitUsage, SharedRateLimiter, rate_limiter_for};
use yaps::{ComparisonService, LeaderboardService, ScoreService, ScoreUpstream};

pub mod cache;
pub mod config;
pub mod error;
pub mod mcp;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod utils;
pub mod yaps;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Option<SharedStore>,
    pub limiter: SharedRateLimiter,
    pub scores: Arc<ScoreService>,
    pub comparisons: Arc<ComparisonService>,
    pub leaderboard: Arc<LeaderboardService>,
}

impl AppState {
    /// 组装各个服务，存储以参数注入
    pub fn new(config: Config, upstream: Arc<dyn ScoreUpstream>, store: Option<SharedStore>) -> Self {
        let limiter = rate_limiter_for(store.clone(), &config);
        let scores = Arc::new(ScoreService::new(
            upstream,
            store.clone(),
            config.score_cache_ttl_secs,
        ));
        let comparisons = Arc::new(ComparisonService::new(
            scores.clone(),
            store.clone(),
            config.score_cache_ttl_secs,
        ));
        let leaderboard = Arc::new(LeaderboardService::new(
            scores.clone(),
            limiter.clone(),
            store.clone(),
            config.tracked_accounts.clone(),
            config.leaderboard_cache_ttl(),
            config.leaderboard_request_delay(),
        ));

        Self {
            config,
            store,
            limiter,
            scores,
            comparisons,
            leaderboard,
        }
    }
}

/// 存储状态
#[derive(Debug, Clone, Serialize)]
pub struct StoreHealth {
    pub backend: &'static str,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breaker: Option<BreakerState>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub environment: &'static str,
    pub cache: StoreHealth,
    pub rate_limiter: &'static str,
    pub rate_limit: RateLimitUsage,
    pub checked_at: DateTime<Utc>,
}

impl AppState {
    pub async fn health(&self) -> HealthReport {
        let cache = match &self.store {
            Some(store) => {
                let reachable = match store.ping().await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("Cache store health check failed: {}", e);
                        false
                    }
                };
                StoreHealth {
                    backend: store.backend_name(),
                    reachable,
                    breaker: Some(store.breaker_state()),
                }
            }
            None => StoreHealth {
                backend: "none",
                reachable: false,
                breaker: None,
            },
        };

        HealthReport {
            status: "ok",
            environment: self.config.environment.as_str(),
            cache,
            rate_limiter: self.limiter.kind(),
            rate_limit: self.limiter.get_usage().await,
            checked_at: Utc::now(),
        }
    }
}
