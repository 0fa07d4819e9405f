/// 缓存后端
/// 键值存储抽象：按字符串键读写字节，写入时带过期时间

mod memory;
mod redis_backend;

pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;

use std::time::Duration;

use async_trait::async_trait;

use super::error::BackendError;

/// 缓存后端需要满足的契约
///
/// 键由上层加好前缀后传入，后端不做任何解释。
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// 读取键；不存在或已过期返回 `None`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// 写入键并设置过期时间，覆盖旧值
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), BackendError>;

    /// 批量删除，逐键尽力而为；只返回删除失败的键及原因。
    /// 删除不存在的键视为成功。
    async fn delete_many(&self, keys: &[String]) -> Vec<(String, BackendError)>;
}
