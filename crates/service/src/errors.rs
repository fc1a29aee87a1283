use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock { product_id: Uuid, requested: i32, available: i32 },
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn conflict(entity: &str, field: &str, value: &str) -> Self {
        Self::Conflict(format!("{} with {} '{}' already exists", entity, field, value))
    }

    /// Receipt that would push on-hand stock past what the column can hold.
    pub fn quantity_overflow(added: i32, on_hand: i32) -> Self {
        Self::Validation(format!("adding {} to on-hand {} exceeds the maximum quantity {}", added, on_hand, i32::MAX))
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 2001,
            ServiceError::NotFound(_) => 2002,
            ServiceError::Conflict(_) => 2003,
            ServiceError::InsufficientStock { .. } => 2004,
            ServiceError::Model(_) => 2005,
            ServiceError::Db(_) => 2100,
        }
    }
}

/// Map a driver error, surfacing constraint violations as their business meaning.
pub fn db_err(e: DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => ServiceError::Conflict(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => ServiceError::not_found("product"),
        _ => ServiceError::Db(e.to_string()),
    }
}
