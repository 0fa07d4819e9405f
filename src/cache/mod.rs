// 缓存模块
// 带标签索引的响应缓存：按键读写，按标签批量失效

pub mod backend;
pub mod codec;
mod compute;
mod error;
mod facade;
pub mod keys;
mod lock;
mod payload;
mod tags;

// 重新导出常用类型，方便其他模块使用
pub use backend::{CacheBackend, MemoryBackend, RedisBackend};
pub use compute::Coalescer;
pub use error::{BackendError, CacheError};
pub use facade::{Cache, CacheOptions, FlushReport, TaggedCache};
pub use payload::{Cacheable, Projection, Shape};
pub use tags::TagIndex;
