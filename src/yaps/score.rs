use std::sync::Arc;

use super::client::ScoreUpstream;
use super::model::YapsScore;
use crate::cache::keys::score_key;
use crate::cache::{JsonCacheOperations, SharedStore};
use crate::error::YapsError;
use crate::utils::normalize_username;

/// 积分查询：先读缓存，未命中时请求上游并写回缓存
pub struct ScoreService {
    upstream: Arc<dyn ScoreUpstream>,
    store: Option<SharedStore>,
    ttl_secs: u64,
}

impl ScoreService {
    pub fn new(upstream: Arc<dyn ScoreUpstream>, store: Option<SharedStore>, ttl_secs: u64) -> Self {
        Self {
            upstream,
            store,
            ttl_secs,
        }
    }

    pub async fn get_score(&self, handle: &str) -> Result<YapsScore, YapsError> {
        let username = normalize_username(handle);
        if username.is_empty() {
            return Err(YapsError::InvalidHandle);
        }
        let key = score_key(username);

        if let Some(store) = &self.store {
            match JsonCacheOperations::get::<YapsScore>(store.as_ref(), &key).await {
                Ok(Some(score)) => {
                    tracing::debug!("Get score from cache: {}", key);
                    return Ok(score);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Score cache read failed for {}: {}", key, e),
            }
        }

        let raw = self.upstream.fetch(username).await.inspect_err(|e| {
            if let YapsError::Fetch { username, reason } = e {
                tracing::error!("Error fetching YAPS score for {}: {}", username, reason);
            }
        })?;
        let score = YapsScore::from_upstream(username.to_string(), raw);

        if let Some(store) = &self.store {
            match JsonCacheOperations::set(store.as_ref(), &key, &score, self.ttl_secs).await {
                Ok(()) => tracing::debug!("Set score to cache: {}", key),
                Err(e) => tracing::warn!("Score cache write failed for {}: {}", key, e),
            }
        }

        Ok(score)
    }
}
