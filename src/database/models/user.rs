use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 用户数据库实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 创建或更新用户时写入的字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
