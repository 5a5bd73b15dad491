#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use async_trait::async_trait;
use yaps_mcp::cache::Store;
use yaps_mcp::config::Config;
use yaps_mcp::error::{CacheError, YapsError};
use yaps_mcp::yaps::{ScoreUpstream, UpstreamScore};

static INIT: Once = Once::new();

/// 测试日志只输出 warn 以上
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
            .with_test_writer()
            .try_init();
    });
}

pub fn raw_score(user_id: &str, l24h: f64, l30d: f64) -> UpstreamScore {
    UpstreamScore {
        user_id: user_id.to_string(),
        yaps_all: l30d * 12.0,
        yaps_l24h: l24h,
        yaps_l7d: l30d / 4.0,
        yaps_l30d: l30d,
    }
}

/// 计数的假上游，未登记的用户名返回失败
#[derive(Default)]
pub struct FakeUpstream {
    scores: HashMap<String, UpstreamScore>,
    failing: HashSet<String>,
    calls: AtomicUsize,
    requested: std::sync::Mutex<Vec<String>>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, username: &str, l24h: f64, l30d: f64) -> Self {
        self.scores
            .insert(username.to_string(), raw_score(&format!("id-{}", username), l24h, l30d));
        self
    }

    pub fn with_failure(mut self, username: &str) -> Self {
        self.failing.insert(username.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScoreUpstream for FakeUpstream {
    async fn fetch(&self, username: &str) -> Result<UpstreamScore, YapsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(username.to_string());

        if self.failing.contains(username) {
            return Err(YapsError::Fetch {
                username: username.to_string(),
                reason: "upstream returned 500 Internal Server Error".into(),
            });
        }
        self.scores.get(username).cloned().ok_or_else(|| YapsError::Fetch {
            username: username.to_string(),
            reason: "upstream returned 404 Not Found".into(),
        })
    }
}

/// 永远不可用的存储
pub struct DownStore;

#[async_trait]
impl Store for DownStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable)
    }
    async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<(), CacheError> {
        Err(CacheError::Unavailable)
    }
    async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
        Err(CacheError::Unavailable)
    }
    async fn incr(&self, _key: &str) -> Result<i64, CacheError> {
        Err(CacheError::Unavailable)
    }
    async fn del(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable)
    }
    async fn ping(&self) -> Result<(), CacheError> {
        Err(CacheError::Unavailable)
    }
    fn backend_name(&self) -> &'static str {
        "down"
    }
}

/// 测试配置，其余项使用默认值
pub fn test_config(pairs: &[(&str, &str)]) -> Config {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| match key {
        "LEADERBOARD_REQUEST_DELAY_MS" if !map.contains_key(key) => Some("0".into()),
        _ => map.get(key).cloned(),
    })
    .expect("valid test config")
}

pub fn accounts(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("user{:02}", i)).collect()
}

/// 每个账号的 24 小时积分互不相同，且与遍历顺序无关（n 不能是 7 的倍数）
pub fn upstream_for(accounts: &[String]) -> FakeUpstream {
    accounts
        .iter()
        .enumerate()
        .fold(FakeUpstream::new(), |up, (i, name)| {
            let l24h = ((i * 7) % accounts.len()) as f64 * 10.0 + 1.0;
            up.with_score(name, l24h, 100.0 + i as f64)
        })
}
