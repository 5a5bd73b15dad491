use serde::{Serialize, de::DeserializeOwned};

use crate::cache::store::Store;
use crate::error::CacheError;

/// JSON 值的缓存读写
pub struct JsonCacheOperations;

impl JsonCacheOperations {
    /// 读取并反序列化，不存在时返回 None
    pub async fn get<T: DeserializeOwned>(
        store: &dyn Store,
        key: &str,
    ) -> Result<Option<T>, CacheError> {
        match store.get(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// 序列化后写入并设置过期时间
    pub async fn set<T: Serialize + Sync>(
        store: &dyn Store,
        key: &str,
        value: &T,
        ttl_secs: u64,
    ) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)?;
        store.set_ex(key, &json, ttl_secs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        value: f64,
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = MemoryStore::new();
        let got: Option<Sample> = JsonCacheOperations::get(&store, "nope").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn corrupt_json_is_an_error() {
        let store = MemoryStore::new();
        store.set_ex("bad", "{not json", 60).await.unwrap();
        let got = JsonCacheOperations::get::<Sample>(&store, "bad").await;
        assert!(matches!(got, Err(CacheError::Serialization(_))));
    }

    #[tokio::test]
    async fn stored_value_reads_back() {
        let store = MemoryStore::new();
        let sample = Sample { name: "a".into(), value: 1.5 };
        JsonCacheOperations::set(&store, "s", &sample, 60).await.unwrap();
        let got: Option<Sample> = JsonCacheOperations::get(&store, "s").await.unwrap();
        assert_eq!(got, Some(sample));
    }
}
