use std::sync::Arc;

use sqlx::PgPool;

use cache::Cache;
use config::Config;
use services::UserService;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod services;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub cache: Arc<Cache>,
    pub users: UserService,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config, cache: Arc<Cache>) -> Self {
        Self {
            users: UserService::new(pool.clone()),
            pool,
            config,
            cache,
        }
    }
}
