use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::CacheBackend;
use crate::cache::error::BackendError;
use crate::cache::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::backend::memory";

// 过期时间溢出时使用的上限，约 30 年
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

struct MemoryEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// 进程内缓存后端
///
/// 过期采用惰性淘汰：读到过期条目时当作不存在并删除。
/// 时间取自 `tokio::time`，测试中可以暂停时钟。
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前未过期的条目数
    pub fn len(&self) -> usize {
        let now = Instant::now();
        rw_read(&self.entries, SOURCE, "len")
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 键是否存在且未过期
    pub fn contains(&self, key: &str) -> bool {
        rw_read(&self.entries, SOURCE, "contains")
            .get(key)
            .is_some_and(|entry| entry.expires_at > Instant::now())
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let now = Instant::now();
        {
            let entries = rw_read(&self.entries, SOURCE, "get");
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // 过期条目，升级为写锁后再确认一次
        let mut entries = rw_write(&self.entries, SOURCE, "get.expire");
        if entries.get(key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), BackendError> {
        let entry = MemoryEntry {
            value,
            expires_at: Instant::now()
                .checked_add(ttl)
                .unwrap_or_else(|| Instant::now() + FAR_FUTURE),
        };
        rw_write(&self.entries, SOURCE, "set").insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> Vec<(String, BackendError)> {
        let mut entries = rw_write(&self.entries, SOURCE, "delete_many");
        for key in keys {
            entries.remove(key);
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_returns_none_for_unknown_key() {
        let backend = MemoryBackend::new();
        assert!(backend.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let backend = MemoryBackend::new();
        let ttl = Duration::from_secs(60);

        backend.set("k", b"one".to_vec(), ttl).await.unwrap();
        backend.set("k", b"two".to_vec(), ttl).await.unwrap();

        assert_eq!(backend.get("k").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let backend = MemoryBackend::new();
        backend
            .set("k", b"v".to_vec(), Duration::from_secs(5))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(backend.get("k").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(backend.get("k").await.unwrap().is_none());
        assert!(!backend.contains("k"));
    }

    #[tokio::test]
    async fn delete_many_ignores_missing_keys() {
        let backend = MemoryBackend::new();
        let ttl = Duration::from_secs(60);
        backend.set("a", b"1".to_vec(), ttl).await.unwrap();
        backend.set("b", b"2".to_vec(), ttl).await.unwrap();

        let failed = backend
            .delete_many(&["a".to_string(), "ghost".to_string()])
            .await;

        assert!(failed.is_empty());
        assert!(!backend.contains("a"));
        assert!(backend.contains("b"));
    }

    #[tokio::test]
    async fn oversized_ttl_does_not_overflow() {
        let backend = MemoryBackend::new();

        backend
            .set("k", b"v".to_vec(), Duration::from_secs(u64::MAX))
            .await
            .unwrap();

        assert!(backend.contains("k"));
    }
}
