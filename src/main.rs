use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_service::{AppState, cache::Cache, config::Config, database, router};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // 加载配置
    let config = Config::from_env()?;

    // 设置数据库连接池
    let pool = database::connect(&config)
        .await
        .map_err(|e| format!("Failed to connect to Postgres: {e}"))?;

    // 设置缓存
    let cache = Cache::from_config(&config)
        .await
        .map_err(|e| format!("Failed to initialise cache: {e}"))?;
    tracing::info!(
        driver = ?config.cache_driver,
        prefix = %config.cache_prefix,
        ttl_minutes = config.cache_minute_duration,
        "Cache ready"
    );

    let state = AppState::new(pool, config.clone(), Arc::new(cache));
    let app = router::create_router(state);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
