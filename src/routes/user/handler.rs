use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    cache::{
        Cache,
        keys::{USERS_TAG, user_key, users_page_key},
    },
    database::PageRequest,
    error::AppError,
    utils::success_to_api_response,
};

use super::model::{DeleteUserResponse, ListUsersQuery, UserRequest};

/// 用户分页列表
#[axum::debug_handler]
pub async fn get_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let request = PageRequest::new(query.page, query.limit);
    let search = query.search_term();

    let key = users_page_key(request.page, request.limit, search);
    let users = state
        .cache
        .get_or_compute(&key, &[USERS_TAG], || state.users.get_users(request, search))
        .await?;

    Ok((StatusCode::OK, success_to_api_response(users)))
}

/// 单个用户，不存在时返回 `{"data": null}`
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .cache
        .get_or_compute(&user_key(id), &[USERS_TAG], || state.users.get_user(id))
        .await?;

    Ok((StatusCode::OK, success_to_api_response(user)))
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<UserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let changes = req.validate()?;
    let user = state.users.create_user(&changes).await?;

    invalidate_users(&state.cache).await;

    Ok((StatusCode::CREATED, success_to_api_response(user)))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let changes = req.validate()?;
    let user = state
        .users
        .update_user(id, &changes)
        .await?
        .ok_or(AppError::NotFound)?;

    invalidate_users(&state.cache).await;

    Ok((StatusCode::OK, success_to_api_response(user)))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.users.delete_user(id).await? {
        return Err(AppError::NotFound);
    }

    invalidate_users(&state.cache).await;

    Ok((StatusCode::OK, success_to_api_response(DeleteUserResponse { id })))
}

/// 写操作成功后清除用户缓存；失败只记录日志，不影响本次请求
async fn invalidate_users(cache: &Cache) {
    if let Err(e) = cache.tags(&[USERS_TAG]).flush().await {
        tracing::warn!("Failed to flush user cache: {}", e);
    }
}
