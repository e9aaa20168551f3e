//! 产品业务服务

use serde_json::{Map, Value};
use tracing::{error, info};

use super::model::{Product, ProductView};
use super::repository::{DynProductRepository, RepositoryError};
use super::validation::{validate_new_product, validate_product_changes};
use crate::core::{error::CoreError, response::ApiResponse};

#[derive(Clone)]
pub struct ProductService {
    repository: DynProductRepository,
}

impl ProductService {
    pub fn new(repository: DynProductRepository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<ApiResponse, CoreError> {
        let products = self
            .repository
            .find_all()
            .await
            .map_err(CoreError::storage)?;

        collection(products)
    }

    pub async fn create(&self, input: &Map<String, Value>) -> Result<ApiResponse, CoreError> {
        let new_product = validate_new_product(input)?;

        match self.repository.create(new_product).await {
            Ok(product) => {
                info!("Created product: {} ({})", product.name, product.id);
                Ok(ApiResponse::message("Product added with success!"))
            }
            Err(e) => {
                error!("Failed to create product: {}", e);
                Err(CoreError::InternalServerError(
                    "The product was not added, something went wrong".to_string(),
                ))
            }
        }
    }

    pub async fn show(&self, id: i64) -> Result<ApiResponse, CoreError> {
        let product = self
            .repository
            .find_by_id(id)
            .await
            .map_err(CoreError::storage)?
            .ok_or_else(CoreError::product_not_found)?;

        Ok(ApiResponse::product(product.into()))
    }

    pub async fn update(&self, id: i64, input: &Map<String, Value>) -> Result<ApiResponse, CoreError> {
        self.ensure_exists(id).await?;

        let changes = validate_product_changes(input)?;
        if !changes.is_empty() {
            self.repository
                .update(id, changes)
                .await
                .map_err(CoreError::storage)?;
            info!("Updated product: {}", id);
        }

        Ok(ApiResponse::message("Product updated successfully"))
    }

    pub async fn destroy(&self, id: i64) -> Result<ApiResponse, CoreError> {
        self.ensure_exists(id).await?;

        self.repository
            .delete(id)
            .await
            .map_err(CoreError::storage)?;
        info!("Deleted product: {}", id);

        Ok(ApiResponse::message("Product deleted successfully"))
    }

    pub async fn search_by_name(&self, name: &str) -> Result<ApiResponse, CoreError> {
        if name.is_empty() {
            return Err(CoreError::BadRequest("Search query is required".to_string()));
        }

        let products = self
            .repository
            .search_by_name(name)
            .await
            .map_err(CoreError::storage)?;

        collection(products)
    }

    pub async fn ping_storage(&self) -> Result<(), RepositoryError> {
        self.repository.ping().await
    }

    pub fn storage_backend(&self) -> &'static str {
        self.repository.backend()
    }

    async fn ensure_exists(&self, id: i64) -> Result<(), CoreError> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(CoreError::storage)?
            .map(|_| ())
            .ok_or_else(CoreError::product_not_found)
    }
}

/// 空集合按 404 处理
fn collection(products: Vec<Product>) -> Result<ApiResponse, CoreError> {
    if products.is_empty() {
        return Err(CoreError::no_products());
    }

    Ok(ApiResponse::products(
        products.into_iter().map(ProductView::from).collect(),
    ))
}
