//! 产品处理器

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Map, Value};
use tracing::warn;

use super::service::ProductService;
use crate::core::{error::CoreError, response::ApiResponse};

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

impl AppState {
    pub fn new(product_service: ProductService) -> Self {
        Self { product_service }
    }
}

pub async fn list_products(State(state): State<AppState>) -> Result<ApiResponse, CoreError> {
    state.product_service.list().await
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse, CoreError> {
    let input = request_fields(payload)?;
    state.product_service.create(&input).await
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse, CoreError> {
    state.product_service.show(product_id(&id)?).await
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse, CoreError> {
    let id = product_id(&id)?;
    let input = request_fields(payload)?;
    state.product_service.update(id, &input).await
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse, CoreError> {
    state.product_service.destroy(product_id(&id)?).await
}

pub async fn search_products(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ApiResponse, CoreError> {
    state.product_service.search_by_name(&name).await
}

/// `/products/search` 没有查询词
pub async fn search_products_without_query(
    State(state): State<AppState>,
) -> Result<ApiResponse, CoreError> {
    state.product_service.search_by_name("").await
}

/// `/products/search` 上的写方法按资源路由处理：不存在的产品
pub async fn product_not_found() -> CoreError {
    CoreError::product_not_found()
}

/// 健康检查
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let backend = state.product_service.storage_backend();

    match state.product_service.ping_storage().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "storage": "connected",
                "backend": backend,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "storage": "unreachable",
                    "backend": backend,
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                })),
            )
        }
    }
}

/// 非整数 id 视为不存在的产品
fn product_id(raw: &str) -> Result<i64, CoreError> {
    raw.parse().map_err(|_| CoreError::product_not_found())
}

fn request_fields(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Map<String, Value>, CoreError> {
    match payload {
        Ok(Json(Value::Object(fields))) => Ok(fields),
        Ok(Json(_)) => Err(CoreError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
        Err(rejection) => Err(CoreError::BadRequest(rejection.body_text())),
    }
}
