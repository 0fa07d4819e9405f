use std::time::Duration;

use thiserror::Error;

/// 后端存储错误
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// 缓存层错误
///
/// 除编码错误外，所有错误对调用方都是"软失败"：读路径退化为未命中，
/// 写路径退化为本次不缓存。
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    BackendUnavailable(#[from] BackendError),

    #[error("failed to encode cache payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode cache payload: {0}")]
    Decode(String),

    #[error("cache operation `{op}` timed out after {timeout:?}")]
    Timeout {
        op: &'static str,
        timeout: Duration,
    },

    #[error("flush left {} of {attempted} keys in the backend", failed.len())]
    FlushIncomplete {
        failed: Vec<String>,
        attempted: usize,
    },
}
