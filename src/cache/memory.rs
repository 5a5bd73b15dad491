use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::store::Store;
use crate::error::CacheError;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

// 写入时清理过期键的条件：条目数翻倍，或距上次清理超过该间隔
const SWEEP_MIN_ENTRIES: usize = 1024;
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Entries {
    map: HashMap<String, Entry>,
    sweep_at_len: usize,
    last_sweep: Instant,
}

impl Default for Entries {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            sweep_at_len: SWEEP_MIN_ENTRIES,
            last_sweep: Instant::now(),
        }
    }
}

impl Entries {
    /// 过期的键只在被读到时删除，没人再读的键靠这里回收
    fn sweep_if_due(&mut self, now: Instant) {
        if self.map.len() < self.sweep_at_len && now - self.last_sweep < SWEEP_INTERVAL {
            return;
        }
        self.map.retain(|_, e| e.is_live(now));
        self.sweep_at_len = (self.map.len() * 2).max(SWEEP_MIN_ENTRIES);
        self.last_sweep = now;
    }
}

/// 进程内存储，语义与 Redis 的 GET/SETEX/EXISTS/INCR/DEL 一致
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前保存的条目数，包括尚未清理的过期条目
    pub async fn entry_count(&self) -> usize {
        self.entries.lock().await.map.len()
    }

    /// 剩余存活时间，没有过期时间或不存在时返回 None
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        entries
            .map
            .get(key)
            .filter(|e| e.is_live(now))
            .and_then(|e| e.expires_at)
            .map(|at| at - now)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.map.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.map.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.sweep_if_due(now);
        entries.map.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(now + Duration::from_secs(ttl_secs)),
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn incr(&self, key: &str) -> Result<i64, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.sweep_if_due(now);
        let entry = entries
            .map
            .entry(key.to_string())
            .and_modify(|e| {
                if !e.is_live(now) {
                    e.value = "0".to_string();
                    e.expires_at = None;
                }
            })
            .or_insert_with(|| Entry {
                value: "0".to_string(),
                expires_at: None,
            });

        let current: i64 = entry
            .value
            .parse()
            .map_err(|_| CacheError::NotAnInteger(key.to_string()))?;
        let next = current + 1;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().await.map.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
