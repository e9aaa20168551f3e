//! 产品数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// `products` 表中的一行，`properties` 保存为 JSON 文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub properties: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 通过校验的新建产品字段
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub properties: String,
}

/// 部分更新：只有 `Some` 的字段会被写入
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub properties: Option<String>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image.is_none()
            && self.properties.is_none()
    }

    /// 所有字段齐全时转换为 [`NewProduct`]
    pub fn into_new_product(self) -> Option<NewProduct> {
        match self {
            ProductChanges {
                name: Some(name),
                description: Some(description),
                price: Some(price),
                image: Some(image),
                properties: Some(properties),
            } => Some(NewProduct {
                name,
                description,
                price,
                image,
                properties,
            }),
            _ => None,
        }
    }

    /// 将更新应用到已有记录上，并刷新 `updated_at`
    pub fn apply_to(self, product: &mut Product, now: DateTime<Utc>) {
        if self.is_empty() {
            return;
        }
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(image) = self.image {
            product.image = image;
        }
        if let Some(properties) = self.properties {
            product.properties = properties;
        }
        product.updated_at = now;
    }
}

/// 返回给客户端的产品，`properties` 已解码为 JSON 值
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub properties: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let properties = match serde_json::from_str(&product.properties) {
            Ok(value) => value,
            Err(e) => {
                warn!("Product {} has undecodable properties: {}", product.id, e);
                Value::Null
            }
        };

        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            image: product.image,
            properties,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}
