use sqlx::PgPool;

use crate::database::models::user::{UserChanges, UserEntity};
use crate::database::pagination::{PageRequest, Pagination};

const USER_COLUMNS: &str = "id, first_name, last_name, email, created_at, updated_at";

/// 用户存储库实现
pub struct UserRepository;

impl UserRepository {
    /// 分页查询用户，`search` 按邮箱和姓名模糊匹配
    pub async fn get_user_paginate(
        pool: &PgPool,
        request: PageRequest,
        search: Option<&str>,
    ) -> Result<Pagination<UserEntity>, sqlx::Error> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let (total_rows, rows) = match pattern {
            Some(pattern) => {
                let filter = "WHERE email ILIKE $1 OR first_name ILIKE $1 OR last_name ILIKE $1";

                let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {filter}"))
                    .bind(&pattern)
                    .fetch_one(pool)
                    .await?;

                let rows = sqlx::query_as::<_, UserEntity>(&format!(
                    "SELECT {USER_COLUMNS} FROM users {filter} ORDER BY id LIMIT $2 OFFSET $3"
                ))
                .bind(&pattern)
                .bind(request.limit)
                .bind(request.offset())
                .fetch_all(pool)
                .await?;

                (total, rows)
            }
            None => {
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                    .fetch_one(pool)
                    .await?;

                let rows = sqlx::query_as::<_, UserEntity>(&format!(
                    "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2"
                ))
                .bind(request.limit)
                .bind(request.offset())
                .fetch_all(pool)
                .await?;

                (total, rows)
            }
        };

        Ok(Pagination::from_request(request, total_rows, rows))
    }

    /// 根据ID查找用户
    pub async fn get_user_by_id(pool: &PgPool, id: i64) -> Result<Option<UserEntity>, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// 创建用户
    pub async fn create_user(pool: &PgPool, user: &UserChanges) -> Result<UserEntity, sqlx::Error> {
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, email, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .fetch_one(pool)
        .await;

        match result {
            Ok(user) => {
                tracing::info!("Created user: {}", user.id);
                Ok(user)
            }
            Err(e) => {
                tracing::error!("Failed to create user: {:?}", e);
                Err(e)
            }
        }
    }

    /// 更新用户，用户不存在时返回 `None`
    pub async fn update_user(
        pool: &PgPool,
        id: i64,
        user: &UserChanges,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET first_name = $1, last_name = $2, email = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// 删除用户，返回是否删除了记录
    pub async fn delete_user(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// 构造 ILIKE 子串匹配模式，转义通配符
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("ann"), "%ann%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
