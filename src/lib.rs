//! # 产品 CRUD 服务
//!
//! 基于 Axum 的单资源 REST API，分为三层：
//! - `app`：路由、处理器、产品业务服务与存储接口
//! - `core`：统一错误、响应结构、中间件
//! - `infrastructure`：配置、日志、数据库连接

pub mod app;
pub mod core;
pub mod infrastructure;

use std::sync::Arc;

use app::product::repository::{DynProductRepository, MemoryProductRepository};
use infrastructure::config::{DatabaseConfig, StorageBackend};

/// 按配置创建存储后端
pub async fn build_repository(config: &DatabaseConfig) -> anyhow::Result<DynProductRepository> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryProductRepository::new())),
        #[cfg(feature = "database")]
        StorageBackend::Postgres => {
            let db = infrastructure::database::DatabaseManager::new(config).await?;
            Ok(Arc::new(app::product::postgres::PgProductRepository::new(
                db.into_pool(),
            )))
        }
        #[cfg(not(feature = "database"))]
        StorageBackend::Postgres => {
            anyhow::bail!("postgres backend requires the `database` feature")
        }
    }
}
