//! 产品资源：模型、校验、存储、服务与处理器

pub mod handler;
pub mod model;
#[cfg(feature = "database")]
pub mod postgres;
pub mod repository;
pub mod service;
pub mod validation;
