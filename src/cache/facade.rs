//! 缓存门面
//!
//! 对外提供按键读取、带标签写入、按标签失效三个操作，
//! 负责键前缀与默认过期时间，协调编解码、后端和标签索引。
//!
//! 缓存只是优化：后端故障时读退化为未命中，写和失效返回软错误，
//! 由调用方记录日志后继续处理请求。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{Instrument, debug, instrument, warn};

use super::backend::{CacheBackend, MemoryBackend, RedisBackend};
use super::codec;
use super::error::{BackendError, CacheError};
use super::payload::Cacheable;
use super::tags::TagIndex;
use crate::config::{CacheDriver, Config};

/// 缓存配置
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// 所有键的全局前缀，用于区分部署环境
    pub prefix: String,
    /// 未显式指定时的过期时间
    pub default_ttl: Duration,
    /// 单次后端调用的超时
    pub op_timeout: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            default_ttl: Duration::from_secs(5 * 60),
            op_timeout: Duration::from_millis(500),
        }
    }
}

impl CacheOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            prefix: config.cache_prefix.clone(),
            default_ttl: config.cache_ttl(),
            op_timeout: config.cache_timeout(),
        }
    }
}

/// 一次成功失效的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// 解析出的键数
    pub resolved: usize,
    /// 从后端删除的键数
    pub deleted: usize,
}

/// 带标签索引的响应缓存
pub struct Cache {
    backend: Arc<dyn CacheBackend>,
    index: Arc<TagIndex>,
    options: CacheOptions,
}

impl Cache {
    pub fn new(backend: Arc<dyn CacheBackend>, options: CacheOptions) -> Self {
        Self {
            backend,
            index: Arc::new(TagIndex::new()),
            options,
        }
    }

    /// 根据配置选择后端并创建缓存
    pub async fn from_config(config: &Config) -> Result<Self, CacheError> {
        let backend: Arc<dyn CacheBackend> = match config.cache_driver {
            CacheDriver::Redis => Arc::new(RedisBackend::connect(&config.redis_url).await?),
            CacheDriver::Memory => {
                tracing::info!("Using in-process memory cache backend");
                Arc::new(MemoryBackend::new())
            }
        };

        Ok(Self::new(backend, CacheOptions::from_config(config)))
    }

    pub fn tag_index(&self) -> &TagIndex {
        &self.index
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.options.prefix, key)
    }

    /// 按键读取
    ///
    /// 未命中、后端故障、超时都返回 `None`。解码失败的条目会被删除。
    #[instrument(level = "debug", skip(self))]
    pub async fn get<V: Cacheable>(&self, key: &str) -> Option<V> {
        let full_key = self.prefixed(key);

        let raw = match timeout(self.options.op_timeout, self.backend.get(&full_key)).await {
            Ok(Ok(Some(raw))) => raw,
            Ok(Ok(None)) => {
                debug!("cache miss");
                return None;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Cache backend read failed, treating as miss");
                return None;
            }
            Err(_) => {
                warn!(timeout = ?self.options.op_timeout, "Cache read timed out, treating as miss");
                return None;
            }
        };

        match codec::decode::<V>(&raw) {
            Ok(value) => {
                debug!("cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(error = %e, "Dropping undecodable cache entry");
                self.evict(key).await;
                None
            }
        }
    }

    /// 按默认过期时间写入并关联标签
    pub async fn set<V: Cacheable>(
        &self,
        key: &str,
        tags: &[&str],
        value: &V,
    ) -> Result<(), CacheError> {
        self.set_with_ttl(key, tags, value, self.options.default_ttl)
            .await
    }

    /// 写入并关联标签
    ///
    /// 先写数据再登记标签：两步之间失败时只会留下一个到期自然消失的条目。
    #[instrument(level = "debug", skip(self, value))]
    pub async fn set_with_ttl<V: Cacheable>(
        &self,
        key: &str,
        tags: &[&str],
        value: &V,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let bytes = codec::encode(value)?;
        let full_key = self.prefixed(key);

        timeout(self.options.op_timeout, self.backend.set(&full_key, bytes, ttl))
            .await
            .map_err(|_| CacheError::Timeout {
                op: "set",
                timeout: self.options.op_timeout,
            })??;

        self.index.retag(key, tags);
        debug!("cache entry stored");
        Ok(())
    }

    /// 删除给定标签关联的全部条目
    ///
    /// 在独立任务中执行，调用方放弃等待时删除仍会完成。
    /// 部分键删除失败不会阻止索引清理，失败的键通过 `FlushIncomplete` 返回。
    #[instrument(skip(self))]
    pub async fn flush(&self, tags: &[&str]) -> Result<FlushReport, CacheError> {
        let job = FlushJob {
            backend: Arc::clone(&self.backend),
            index: Arc::clone(&self.index),
            prefix: self.options.prefix.clone(),
            op_timeout: self.options.op_timeout,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        };

        match tokio::spawn(job.run().in_current_span()).await {
            Ok(result) => result,
            Err(e) => Err(BackendError::Unavailable(format!("flush task failed: {e}")).into()),
        }
    }

    /// 删除单个键并清除其标签关联
    async fn evict(&self, key: &str) {
        let full_key = self.prefixed(key);
        match timeout(
            self.options.op_timeout,
            self.backend.delete_many(std::slice::from_ref(&full_key)),
        )
        .await
        {
            Ok(failed) => {
                for (key, e) in failed {
                    warn!(key = %key, error = %e, "Failed to delete cache entry");
                }
            }
            Err(_) => warn!(key = %full_key, "Cache delete timed out"),
        }
        self.index.forget(key);
    }

    /// 绑定一组标签，便于链式调用：`cache.tags(&["users"]).flush()`
    pub fn tags<'a>(&'a self, tags: &'a [&'a str]) -> TaggedCache<'a> {
        TaggedCache { cache: self, tags }
    }
}

struct FlushJob {
    backend: Arc<dyn CacheBackend>,
    index: Arc<TagIndex>,
    prefix: String,
    op_timeout: Duration,
    tags: Vec<String>,
}

impl FlushJob {
    async fn run(self) -> Result<FlushReport, CacheError> {
        let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();

        let resolved = self.index.keys_for_tags(&tags);
        let first_pass = self.delete(&resolved).await;

        // clear 返回的键全部再删一次：解析之后新关联或被重新写入的键
        // 在索引清理后就无法再按标签失效
        let removed = self.index.clear(&tags);
        let second_pass = self.delete(&removed).await;

        let mut failed: Vec<String> = first_pass
            .into_iter()
            .filter(|key| !removed.contains(key))
            .chain(second_pass)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        failed.sort();

        let attempted = resolved.union(&removed).count();
        if failed.is_empty() {
            debug!(deleted = attempted, "cache tags flushed");
            Ok(FlushReport {
                resolved: attempted,
                deleted: attempted,
            })
        } else {
            warn!(
                failed = failed.len(),
                attempted, "Cache flush left entries in the backend"
            );
            Err(CacheError::FlushIncomplete { failed, attempted })
        }
    }

    /// 删除一批键，返回失败的键（不带前缀）
    async fn delete(&self, keys: &HashSet<String>) -> Vec<String> {
        if keys.is_empty() {
            return Vec::new();
        }

        let full_keys: Vec<String> = keys
            .iter()
            .map(|key| format!("{}{}", self.prefix, key))
            .collect();

        match timeout(self.op_timeout, self.backend.delete_many(&full_keys)).await {
            Ok(failures) => failures
                .into_iter()
                .map(|(full_key, e)| {
                    warn!(key = %full_key, error = %e, "Failed to delete cache entry");
                    full_key
                        .strip_prefix(self.prefix.as_str())
                        .unwrap_or(&full_key)
                        .to_string()
                })
                .collect(),
            Err(_) => {
                warn!(count = keys.len(), timeout = ?self.op_timeout, "Cache delete timed out");
                keys.iter().cloned().collect()
            }
        }
    }
}

/// 绑定了标签的缓存视图
pub struct TaggedCache<'a> {
    cache: &'a Cache,
    tags: &'a [&'a str],
}

impl TaggedCache<'_> {
    pub async fn set<V: Cacheable>(&self, key: &str, value: &V) -> Result<(), CacheError> {
        self.cache.set(key, self.tags, value).await
    }

    pub async fn flush(&self) -> Result<FlushReport, CacheError> {
        self.cache.flush(self.tags).await
    }

    pub async fn get_or_compute<V, E, F, Fut>(&self, key: &str, compute: F) -> Result<V, E>
    where
        V: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.cache.get_or_compute(key, self.tags, compute).await
    }
}
