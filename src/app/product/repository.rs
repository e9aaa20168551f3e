//! 产品存储接口与内存实现

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::model::{NewProduct, Product, ProductChanges};

/// 存储层错误
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("数据库错误: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("存储拒绝写入: {0}")]
    Rejected(String),
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(Box::new(err))
    }
}

/// `products` 表的访问接口，id 由存储层生成
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, RepositoryError>;

    /// 名称中包含 `fragment` 的产品（按字面子串匹配）
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Product>, RepositoryError>;

    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError>;

    async fn update(&self, id: i64, changes: ProductChanges) -> Result<(), RepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    async fn ping(&self) -> Result<(), RepositoryError>;

    fn backend(&self) -> &'static str;
}

pub type DynProductRepository = Arc<dyn ProductRepository>;

#[derive(Default)]
struct MemoryTable {
    rows: BTreeMap<i64, Product>,
    last_id: i64,
}

/// 进程内存储，用于测试和无数据库的本地运行
#[derive(Default)]
pub struct MemoryProductRepository {
    table: Mutex<MemoryTable>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Product>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .values()
            .filter(|product| product.name.contains(fragment))
            .cloned()
            .collect())
    }

    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let mut table = self.table.lock().await;
        table.last_id += 1;
        let now = Utc::now();

        let product = Product {
            id: table.last_id,
            name: product.name,
            description: product.description,
            price: product.price,
            image: product.image,
            properties: product.properties,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: i64, changes: ProductChanges) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        if let Some(product) = table.rows.get_mut(&id) {
            changes.apply_to(product, Utc::now());
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        table.rows.remove(&id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
