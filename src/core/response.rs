//! 核心响应处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::app::product::model::ProductView;

/// 成功响应：`{status: 200, <body>}`
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseBody {
    Products(Vec<ProductView>),
    Product(ProductView),
    Message(String),
}

impl ApiResponse {
    fn ok(body: ResponseBody) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            body,
        }
    }

    pub fn products(products: Vec<ProductView>) -> Self {
        Self::ok(ResponseBody::Products(products))
    }

    pub fn product(product: ProductView) -> Self {
        Self::ok(ResponseBody::Product(product))
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::ok(ResponseBody::Message(message.into()))
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
