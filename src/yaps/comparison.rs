use std::sync::Arc;

use futures_util::future::try_join;

use super::model::{ScoreComparison, ScoreSnapshot};
use super::score::ScoreService;
use crate::cache::keys::comparison_key;
use crate::cache::{JsonCacheOperations, SharedStore};
use crate::error::YapsError;
use crate::utils::normalize_username;

/// 两个账号的积分对比
pub struct ComparisonService {
    scores: Arc<ScoreService>,
    store: Option<SharedStore>,
    ttl_secs: u64,
}

impl ComparisonService {
    pub fn new(scores: Arc<ScoreService>, store: Option<SharedStore>, ttl_secs: u64) -> Self {
        Self {
            scores,
            store,
            ttl_secs,
        }
    }

    /// 并发获取两个积分，任意一个失败则整体失败
    pub async fn compare(&self, handle_a: &str, handle_b: &str) -> Result<ScoreComparison, YapsError> {
        let username_a = normalize_username(handle_a);
        let username_b = normalize_username(handle_b);
        let key = comparison_key(username_a, username_b);

        if let Some(store) = &self.store {
            match JsonCacheOperations::get::<ScoreComparison>(store.as_ref(), &key).await {
                Ok(Some(comparison)) => {
                    tracing::debug!("Get comparison from cache: {}", key);
                    return Ok(comparison.oriented(username_a));
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Comparison cache read failed for {}: {}", key, e),
            }
        }

        let (score_a, score_b) = try_join(
            self.scores.get_score(username_a),
            self.scores.get_score(username_b),
        )
        .await?;

        let comparison = ScoreComparison::new(ScoreSnapshot::from(&score_a), ScoreSnapshot::from(&score_b));

        if let Some(store) = &self.store {
            if let Err(e) = JsonCacheOperations::set(store.as_ref(), &key, &comparison, self.ttl_secs).await {
                tracing::warn!("Comparison cache write failed for {}: {}", key, e);
            }
        }

        Ok(comparison)
    }
}
