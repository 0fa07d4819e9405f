use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::database::Pagination;

/// 缓存值的形态，编码时写入信封，解码时校验
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// 分页结果
    Page,
    /// 单个实体投影
    Entity,
}

/// 可写入缓存的值
pub trait Cacheable: Serialize + DeserializeOwned + Send + Sync {
    const SHAPE: Shape;
}

/// 单个实体的投影，序列化为 `{"data": ...}`
///
/// `data` 为 `None` 表示实体不存在，这也是一个可缓存的结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection<T> {
    pub data: Option<T>,
}

impl<T> Projection<T> {
    pub fn new(data: Option<T>) -> Self {
        Self { data }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }
}

impl<T> Cacheable for Projection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    const SHAPE: Shape = Shape::Entity;
}

impl<T> Cacheable for Pagination<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    const SHAPE: Shape = Shape::Page;
}
