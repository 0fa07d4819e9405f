use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use redis::{AsyncCommands, Client as RedisClient, aio::MultiplexedConnection};

use super::CacheBackend;
use crate::cache::error::BackendError;

/// Redis 缓存后端
///
/// 持有一条多路复用连接，克隆开销很小，每次操作克隆一份使用。
#[derive(Clone)]
pub struct RedisBackend {
    conn: MultiplexedConnection,
}

impl RedisBackend {
    /// 建立连接并 PING 一次，确认 Redis 可用
    pub async fn connect(redis_url: &str) -> Result<Self, BackendError> {
        let client = RedisClient::open(redis_url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;

        let _: () = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::info!("Redis cache backend connected");

        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), BackendError> {
        let mut conn = self.conn.clone();
        // PSETEX 不接受 0
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let _: () = conn.pset_ex(key, value.as_slice(), millis).await?;
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> Vec<(String, BackendError)> {
        // 逐键 DEL，单个失败不影响其他键
        let deletes = keys.iter().map(|key| {
            let mut conn = self.conn.clone();
            async move {
                let result: Result<(), redis::RedisError> = conn.del(key).await;
                (key, result)
            }
        });

        join_all(deletes)
            .await
            .into_iter()
            .filter_map(|(key, result)| result.err().map(|e| (key.clone(), e.into())))
            .collect()
    }
}
