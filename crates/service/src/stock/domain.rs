use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{product, stock_in, stock_out};

/// Stock-in request. `date` defaults to the time of recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStockIn {
    pub reference: String,
    #[serde(default)]
    pub date: Option<DateTimeWithTimeZone>,
    pub supplier: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub product_id: Uuid,
}

/// Stock-out request. `date` defaults to the time of recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStockOut {
    pub reference: String,
    #[serde(default)]
    pub date: Option<DateTimeWithTimeZone>,
    pub department: String,
    pub requester: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub product_id: Uuid,
}

impl NewStockIn {
    pub fn validate(&self) -> Result<(), models::errors::ModelError> {
        stock_in::validate_reference(&self.reference)?;
        stock_in::validate_supplier(&self.supplier)?;
        stock_in::validate_quantity(self.quantity)?;
        stock_in::validate_unit_price(self.unit_price)
    }

    pub fn recorded_at(&self) -> DateTimeWithTimeZone {
        self.date.unwrap_or_else(|| Utc::now().into())
    }
}

impl NewStockOut {
    pub fn validate(&self) -> Result<(), models::errors::ModelError> {
        stock_out::validate_reference(&self.reference)?;
        stock_out::validate_department(&self.department)?;
        stock_out::validate_requester(&self.requester)?;
        stock_out::validate_quantity(self.quantity)?;
        stock_out::validate_unit_price(self.unit_price)
    }

    pub fn recorded_at(&self) -> DateTimeWithTimeZone {
        self.date.unwrap_or_else(|| Utc::now().into())
    }
}

/// Ledger row joined with its owning product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithProduct<T> {
    #[serde(flatten)]
    pub entry: T,
    pub product: Option<product::Model>,
}

pub type StockInWithProduct = WithProduct<stock_in::Model>;
pub type StockOutWithProduct = WithProduct<stock_out::Model>;

impl<T> From<(T, Option<product::Model>)> for WithProduct<T> {
    fn from((entry, product): (T, Option<product::Model>)) -> Self {
        Self { entry, product }
    }
}
