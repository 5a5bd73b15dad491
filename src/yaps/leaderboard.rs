use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::model::{LeaderboardEntry, YapsScore};
use super::score::ScoreService;
use crate::cache::keys::LEADERBOARD_KEY;
use crate::cache::{JsonCacheOperations, SharedStore};
use crate::rate_limit::SharedRateLimiter;

/// 排行榜条目上限
pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone)]
struct CachedLeaderboard {
    built_at: Instant,
    entries: Vec<LeaderboardEntry>,
}

/// 按 24 小时积分排名的每日排行榜
///
/// 有存储时结果写入存储；同时在进程内保留最近一次结果，
/// 存储不可用或未配置时以它为准。
pub struct LeaderboardService {
    scores: Arc<ScoreService>,
    limiter: SharedRateLimiter,
    store: Option<SharedStore>,
    tracked_accounts: Vec<String>,
    ttl: Duration,
    request_delay: Duration,
    latest: Mutex<Option<CachedLeaderboard>>,
}

impl LeaderboardService {
    pub fn new(
        scores: Arc<ScoreService>,
        limiter: SharedRateLimiter,
        store: Option<SharedStore>,
        tracked_accounts: Vec<String>,
        ttl: Duration,
        request_delay: Duration,
    ) -> Self {
        Self {
            scores,
            limiter,
            store,
            tracked_accounts,
            ttl,
            request_delay,
            latest: Mutex::new(None),
        }
    }

    /// 返回未过期的排行榜，否则同步重建
    pub async fn get_leaderboard(&self) -> Vec<LeaderboardEntry> {
        if let Some(store) = &self.store {
            match JsonCacheOperations::get::<Vec<LeaderboardEntry>>(store.as_ref(), LEADERBOARD_KEY).await {
                Ok(Some(entries)) => {
                    tracing::debug!("Get leaderboard from cache");
                    return entries;
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Leaderboard cache read failed: {}", e),
            }
        }

        if let Some(entries) = self.fresh_in_memory().await {
            tracing::debug!("Get leaderboard from memory");
            return entries;
        }

        self.refresh().await
    }

    /// 重建并保存排行榜
    pub async fn refresh(&self) -> Vec<LeaderboardEntry> {
        tracing::info!("Starting leaderboard update...");
        let entries = self.build_leaderboard().await;
        self.persist(&entries).await;
        tracing::info!("Leaderboard updated with {} entries", entries.len());
        entries
    }

    /// 依次获取跟踪账号的积分并排名
    ///
    /// 触发限流时停止遍历，用已经拿到的积分排名；
    /// 单个账号失败只记录日志。
    pub async fn build_leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut scores = Vec::with_capacity(self.tracked_accounts.len());

        for (index, username) in self.tracked_accounts.iter().enumerate() {
            if !self.limiter.check_limit().await {
                tracing::warn!(
                    "Rate limit reached during leaderboard update after {} of {} accounts",
                    index,
                    self.tracked_accounts.len()
                );
                break;
            }

            if index > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            self.limiter.increment_counter().await;
            match self.scores.get_score(username).await {
                Ok(score) => scores.push(score),
                Err(e) => tracing::warn!("Error fetching score for {}: {}", username, e),
            }
        }

        rank_scores(scores)
    }

    /// 后台定时刷新，第一次立即执行
    pub fn spawn_refresh_task(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.refresh().await;
            }
        })
    }

    async fn fresh_in_memory(&self) -> Option<Vec<LeaderboardEntry>> {
        let latest = self.latest.lock().await;
        latest
            .as_ref()
            .filter(|cached| cached.built_at.elapsed() < self.ttl)
            .map(|cached| cached.entries.clone())
    }

    async fn persist(&self, entries: &[LeaderboardEntry]) {
        *self.latest.lock().await = Some(CachedLeaderboard {
            built_at: Instant::now(),
            entries: entries.to_vec(),
        });

        if let Some(store) = &self.store {
            if let Err(e) =
                JsonCacheOperations::set(store.as_ref(), LEADERBOARD_KEY, &entries, self.ttl.as_secs()).await
            {
                tracing::warn!("Leaderboard cache write failed: {}", e);
            }
        }
    }
}

/// 按 24 小时积分降序稳定排序，取前 10 名
pub fn rank_scores(mut scores: Vec<YapsScore>) -> Vec<LeaderboardEntry> {
    scores.sort_by(|a, b| b.yaps_l24h.total_cmp(&a.yaps_l24h));
    scores
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .enumerate()
        .map(|(index, score)| LeaderboardEntry {
            rank: index + 1,
            user_id: score.user_id,
            username: score.username,
            yaps_l24h: score.yaps_l24h,
            yaps_all: score.yaps_all,
        })
        .collect()
}
