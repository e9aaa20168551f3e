//! 应用层：路由与产品资源

pub mod product;

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::core::middleware::{request_logging_middleware, UuidRequestId};
use crate::infrastructure::config::HttpConfig;
use product::handler::{
    create_product, delete_product, get_product, health_check, list_products, product_not_found,
    search_products, search_products_without_query, update_product, AppState,
};

// 创建路由
pub fn create_routes(state: AppState, http: &HttpConfig) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 产品 CRUD 操作
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/search",
            get(search_products_without_query).fallback(product_not_found),
        )
        .route("/products/search/:name", get(search_products))
        .route(
            "/products/:id",
            get(get_product)
                .put(update_product)
                .patch(update_product)
                .delete(delete_product),
        )
        // 后添加的层在外侧：CORS -> 请求 ID -> 超时 -> 追踪 -> 请求日志
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(http.timeout_seconds)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
