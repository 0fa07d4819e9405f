use sqlx::PgPool;
use tracing::instrument;

use crate::cache::Projection;
use crate::database::{PageRequest, Pagination, UserChanges, UserEntity, UserRepository};

/// 用户服务
///
/// 读操作没有副作用，可以被缓存层调用零次、一次或多次。
#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(name = "GetUsersService", skip(self))]
    pub async fn get_users(
        &self,
        request: PageRequest,
        search: Option<&str>,
    ) -> Result<Pagination<UserEntity>, sqlx::Error> {
        UserRepository::get_user_paginate(&self.pool, request, search).await
    }

    /// 查询单个用户；不存在时返回空投影而不是错误
    #[instrument(name = "GetUserService", skip(self))]
    pub async fn get_user(&self, id: i64) -> Result<Projection<UserEntity>, sqlx::Error> {
        let user = UserRepository::get_user_by_id(&self.pool, id).await?;
        Ok(Projection::new(user))
    }

    #[instrument(name = "CreateUserService", skip(self))]
    pub async fn create_user(&self, changes: &UserChanges) -> Result<UserEntity, sqlx::Error> {
        UserRepository::create_user(&self.pool, changes).await
    }

    #[instrument(name = "UpdateUserService", skip(self))]
    pub async fn update_user(
        &self,
        id: i64,
        changes: &UserChanges,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        UserRepository::update_user(&self.pool, id, changes).await
    }

    #[instrument(name = "DeleteUserService", skip(self))]
    pub async fn delete_user(&self, id: i64) -> Result<bool, sqlx::Error> {
        UserRepository::delete_user(&self.pool, id).await
    }
}
