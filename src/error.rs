use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::utils::{error_codes, error_to_api_response};

/// 处理器错误
///
/// 缓存层错误不会出现在这里：缓存失败一律降级处理，只有回源错误会中断请求。
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("用户不存在")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                error_codes::VALIDATION_ERROR,
                message.clone(),
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                error_codes::NOT_FOUND,
                self.to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    "内部服务器错误".to_string(),
                )
            }
        };

        (status, error_to_api_response::<()>(code, message)).into_response()
    }
}
