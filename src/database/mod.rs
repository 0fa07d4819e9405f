// 数据库模块
// 连接池、分页结构、用户实体与存储库

pub mod models; // 数据库实体定义
pub mod pagination;
pub mod repositories; // 存储库操作实现

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;

use crate::config::Config;

// 重新导出常用类型和函数，方便其他模块使用
pub use models::user::{UserChanges, UserEntity};
pub use pagination::{PageRequest, Pagination};
pub use repositories::user::UserRepository;

/// 创建数据库连接池
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    let application_name = config.app_name.replace('\'', "");

    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .after_connect(move |conn, _meta| {
            let statement = format!("SET application_name = '{}';", application_name);
            Box::pin(async move {
                conn.execute(statement.as_str()).await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
}

/// 健康检查用的连通性探测
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
