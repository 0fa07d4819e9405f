use axum::{
    Router,
    http::HeaderValue,
    routing::get,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::{AppState, middleware::log_errors, routes};

/// 用户相关的路由
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(routes::user::get_users).post(routes::user::create_user),
        )
        .route(
            "/users/{id}",
            get(routes::user::get_user)
                .put(routes::user::update_user)
                .delete(routes::user::delete_user),
        )
}

fn cors_layer(origins: Option<Vec<String>>) -> CorsLayer {
    match origins {
        None => CorsLayer::permissive(),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origins());

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health))
        .nest("/api/v1", user_routes())
        .layer(axum::middleware::from_fn(log_errors))
        .layer(cors)
        .with_state(state)
}
