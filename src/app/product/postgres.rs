//! PostgreSQL 产品存储

use async_trait::async_trait;
use sqlx::{postgres::PgPool, Postgres, QueryBuilder};

use super::model::{NewProduct, Product, ProductChanges};
use super::repository::{ProductRepository, RepositoryError};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, image, properties, created_at, updated_at";

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Product>, RepositoryError> {
        // strpos 按字面匹配，用户输入中的 % 和 _ 不是通配符
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE strpos(name, $1) > 0 ORDER BY id"
        ))
        .bind(fragment)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let created = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, description, price, image, properties) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.image)
        .bind(&product.properties)
        .fetch_optional(&self.pool)
        .await?;

        created.ok_or_else(|| RepositoryError::Rejected("INSERT returned no row".to_string()))
    }

    async fn update(&self, id: i64, changes: ProductChanges) -> Result<(), RepositoryError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut query = QueryBuilder::<Postgres>::new("UPDATE products SET updated_at = NOW()");
        if let Some(name) = changes.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(description) = changes.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(price) = changes.price {
            query.push(", price = ").push_bind(price);
        }
        if let Some(image) = changes.image {
            query.push(", image = ").push_bind(image);
        }
        if let Some(properties) = changes.properties {
            query.push(", properties = ").push_bind(properties);
        }
        query.push(" WHERE id = ").push_bind(id);

        query.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use tokio::sync::OnceCell;

    const SCHEMA: &str = include_str!("../../../sql/products.sql");

    static SCHEMA_READY: OnceCell<()> = OnceCell::const_new();

    /// 未设置 `TEST_DATABASE_URL` 时跳过
    async fn test_repository() -> Option<PgProductRepository> {
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        SCHEMA_READY
            .get_or_init(|| async {
                sqlx::query(SCHEMA)
                    .execute(&pool)
                    .await
                    .expect("Failed to create products table");
            })
            .await;

        Some(PgProductRepository::new(pool))
    }

    /// 每个测试用独立的名称前缀，互不干扰
    fn tag() -> String {
        format!("t{}", &uuid::Uuid::new_v4().simple().to_string()[..7])
    }

    fn new_product(name: String) -> NewProduct {
        NewProduct {
            name,
            description: "Ceramic mug".to_string(),
            price: 9.99,
            image: "http://x.test/m.png".to_string(),
            properties: "{\"color\":\"red\"}".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_returns_stored_row() {
        let Some(repo) = test_repository().await else {
            return;
        };
        let name = format!("{} Mug", tag());

        let created = repo.create(new_product(name.clone())).await.unwrap();
        assert_eq!(created.name, name);
        assert_eq!(created.price, 9.99);
        assert_eq!(created.created_at, created.updated_at);

        let stored = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(stored, Some(created.clone()));

        repo.delete(created.id).await.unwrap();
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_update_writes_only_supplied_columns() {
        let Some(repo) = test_repository().await else {
            return;
        };
        let created = repo
            .create(new_product(format!("{} Mug", tag())))
            .await
            .unwrap();

        repo.update(created.id, ProductChanges::default()).await.unwrap();
        let unchanged = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(unchanged, created);

        repo.update(
            created.id,
            ProductChanges {
                price: Some(12.5),
                properties: Some("{\"color\":\"blue\"}".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.properties, "{\"color\":\"blue\"}");
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.image, created.image);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_search_is_literal_and_case_sensitive() {
        let Some(repo) = test_repository().await else {
            return;
        };
        let tag = tag();
        let mug = repo.create(new_product(format!("{tag} Mug"))).await.unwrap();
        let sale = repo
            .create(new_product(format!("{tag} 50% off")))
            .await
            .unwrap();

        let found = repo.search_by_name(&tag).await.unwrap();
        let ids: Vec<i64> = found.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![mug.id, sale.id]);

        assert_eq!(repo.search_by_name(&format!("{tag} 50%")).await.unwrap().len(), 1);
        assert!(repo.search_by_name(&format!("{tag} _ug")).await.unwrap().is_empty());
        assert!(repo.search_by_name(&format!("{tag} %")).await.unwrap().is_empty());
        assert!(repo
            .search_by_name(&tag.to_uppercase())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_find_all_is_ordered_by_id() {
        let Some(repo) = test_repository().await else {
            return;
        };
        let tag = tag();
        let first = repo.create(new_product(format!("{tag} B"))).await.unwrap();
        let second = repo.create(new_product(format!("{tag} A"))).await.unwrap();

        let ids: Vec<i64> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .filter(|p| p.name.starts_with(&tag))
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert!(repo.ping().await.is_ok());
    }
}
