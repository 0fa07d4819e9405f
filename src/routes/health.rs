use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::{
    AppState, database,
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

/// 健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 服务器时间
    pub timestamp: i64,
}

/// 根路径返回应用名
pub async fn root(State(state): State<AppState>) -> String {
    state.config.app_name.clone()
}

/// 健康检查接口，数据库不可用时返回 503
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match database::ping(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            success_to_api_response(HealthResponse {
                status: "ok".to_string(),
                timestamp: chrono::Utc::now().timestamp(),
            }),
        ),
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                error_to_api_response(
                    error_codes::SERVICE_UNAVAILABLE,
                    "数据库不可用".to_string(),
                ),
            )
        }
    }
}
