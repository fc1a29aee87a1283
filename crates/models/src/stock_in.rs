use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::validation;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_in")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub reference: String,
    pub date: DateTimeWithTimeZone,
    pub supplier: String,
    pub notes: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub product_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_reference(reference: &str) -> Result<(), ModelError> {
    validation::require_text("reference", reference, 128)
}

pub fn validate_supplier(supplier: &str) -> Result<(), ModelError> {
    validation::require_text("supplier", supplier, 255)
}

pub fn validate_quantity(quantity: i32) -> Result<(), ModelError> {
    validation::positive_count("quantity", quantity)
}

pub fn validate_unit_price(unit_price: Decimal) -> Result<(), ModelError> {
    validation::non_negative_amount("unitPrice", unit_price)
}
