use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::validation;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_out")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub reference: String,
    pub date: DateTimeWithTimeZone,
    pub department: String,
    pub requester: String,
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

pub fn validate_department(department: &str) -> Result<(), ModelError> {
    validation::require_text("department", department, 128)
}

pub fn validate_requester(requester: &str) -> Result<(), ModelError> {
    validation::require_text("requester", requester, 128)
}

// Reference, quantity and unit price follow the same rules as inbound entries.
pub use super::stock_in::{validate_quantity, validate_reference, validate_unit_price};
