//! 核心错误处理模块

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

use crate::app::product::repository::RepositoryError;

/// 核心错误类型，每个变体对应一种固定的响应形状
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// 空集合，响应体使用 `response` 字段
    #[error("{0}")]
    NoResults(String),
    #[error("{0}")]
    InternalServerError(String),
}

impl CoreError {
    pub fn product_not_found() -> Self {
        CoreError::NotFound("Product not found".to_string())
    }

    pub fn no_products() -> Self {
        CoreError::NoResults("No products found".to_string())
    }

    /// 记录存储层错误，对外只返回通用信息
    pub fn storage(err: RepositoryError) -> Self {
        error!("Storage error: {}", err);
        CoreError::InternalServerError("Something went wrong".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CoreError::NotFound(_) | CoreError::NoResults(_) => StatusCode::NOT_FOUND,
            CoreError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(err: ValidationErrors) -> Self {
        CoreError::Validation(err)
    }
}

/// 字段名 -> 错误信息列表
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("The {field} field is invalid."))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            CoreError::Validation(errors) => json!({ "errors": field_messages(&errors) }),
            CoreError::NoResults(msg) => json!({
                "status": status.as_u16(),
                "response": msg,
            }),
            CoreError::BadRequest(msg)
            | CoreError::NotFound(msg)
            | CoreError::InternalServerError(msg) => json!({
                "status": status.as_u16(),
                "message": msg,
            }),
        };

        (status, Json(body)).into_response()
    }
}
