//! 先查缓存、未命中再回源的读取模式

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use super::facade::Cache;
use super::lock::mutex_lock;
use super::payload::Cacheable;

const SOURCE: &str = "cache::compute";

impl Cache {
    /// 读取缓存，未命中时调用 `compute` 回源并写回缓存
    ///
    /// - 回源失败：原样返回错误，不写缓存
    /// - 写缓存失败：仍返回回源结果，只记录日志
    /// - 回源结果为"空"（空页、不存在的实体）同样缓存，是否命中只看缓存是否找到
    ///
    /// 同一个键的并发未命中不会合并，每个调用都会回源一次；
    /// 需要合并时使用 [`Coalescer`]。
    pub async fn get_or_compute<V, E, F, Fut>(
        &self,
        key: &str,
        tags: &[&str],
        compute: F,
    ) -> Result<V, E>
    where
        V: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get::<V>(key).await {
            return Ok(value);
        }

        debug!(key, "cache miss, fetching from origin");
        let value = compute().await?;

        if let Err(e) = self.set(key, tags, &value).await {
            warn!(key, error = %e, "Failed to populate cache, serving uncached result");
        }

        Ok(value)
    }
}

/// 按键合并并发回源
///
/// 同一进程内，同一个键同一时刻只有一个调用者执行回源，
/// 其余调用者等待后直接命中缓存。缓存写入失败时等待者会各自回源。
pub struct Coalescer {
    cache: Arc<Cache>,
    inflight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl Coalescer {
    pub fn new(cache: Arc<Cache>) -> Self {
        Self {
            cache,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_or_compute<V, E, F, Fut>(
        &self,
        key: &str,
        tags: &[&str],
        compute: F,
    ) -> Result<V, E>
    where
        V: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        // 已命中时不必排队
        if let Some(value) = self.cache.get::<V>(key).await {
            return Ok(value);
        }

        let slot = {
            let mut inflight = mutex_lock(&self.inflight, SOURCE, "acquire");
            Arc::clone(inflight.entry(key.to_string()).or_default())
        };

        let result = {
            let _guard = slot.lock().await;
            self.cache.get_or_compute(key, tags, compute).await
        };

        self.release(key, slot);
        result
    }

    /// 在没有其他等待者时移除键对应的锁
    fn release(&self, key: &str, slot: Arc<AsyncMutex<()>>) {
        let mut inflight = mutex_lock(&self.inflight, SOURCE, "release");
        // 表里一份，加上这里持有的一份
        if Arc::strong_count(&slot) == 2 {
            inflight.remove(key);
        }
    }

    /// 正在进行中的键数
    pub fn inflight(&self) -> usize {
        mutex_lock(&self.inflight, SOURCE, "inflight").len()
    }
}
