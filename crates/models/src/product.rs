use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::validation;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// External product code, e.g. `P001`.
    #[sea_orm(unique)]
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub min_stock: i32,
    /// Cached on-hand count; equals initial stock plus net ledger movement.
    pub quantity: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_in::Entity")]
    StockIn,
    #[sea_orm(has_many = "super::stock_out::Entity")]
    StockOut,
}

impl Related<super::stock_in::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockIn.def()
    }
}

impl Related<super::stock_out::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockOut.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }
}

pub fn validate_product_code(code: &str) -> Result<(), ModelError> {
    validation::require_text("productId", code, 64)?;
    if code.chars().any(char::is_whitespace) {
        return Err(ModelError::Validation("productId must not contain whitespace".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    validation::require_text("name", name, 255)
}

pub fn validate_category(category: &str) -> Result<(), ModelError> {
    validation::require_text("category", category, 128)
}

pub fn validate_unit(unit: &str) -> Result<(), ModelError> {
    validation::require_text("unit", unit, 32)
}

pub fn validate_price(price: Decimal) -> Result<(), ModelError> {
    validation::non_negative_amount("price", price)
}

pub fn validate_min_stock(min_stock: i32) -> Result<(), ModelError> {
    validation::non_negative_count("minStock", min_stock)
}

pub fn validate_quantity(quantity: i32) -> Result<(), ModelError> {
    validation::non_negative_count("quantity", quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_code_rules() {
        assert!(validate_product_code("P001").is_ok());
        assert!(validate_product_code("").is_err());
        assert!(validate_product_code("P 001").is_err());
    }
}
