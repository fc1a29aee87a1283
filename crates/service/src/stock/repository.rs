use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use models::{product, stock_in, stock_out};

use super::domain::{StockInWithProduct, StockOutWithProduct};
use crate::errors::{db_err, ServiceError};

/// Read side of the stock ledgers. Writes belong to the reconciler so that a
/// ledger row never exists without its quantity adjustment.
#[async_trait]
pub trait StockLedgerRepository: Send + Sync {
    /// Newest first; restricted to one product when `product_id` is set.
    async fn list_stock_in(&self, product_id: Option<Uuid>) -> Result<Vec<StockInWithProduct>, ServiceError>;
    async fn find_stock_in(&self, id: Uuid) -> Result<Option<StockInWithProduct>, ServiceError>;
    async fn find_stock_in_by_reference(&self, reference: &str) -> Result<Option<StockInWithProduct>, ServiceError>;

    async fn list_stock_out(&self, product_id: Option<Uuid>) -> Result<Vec<StockOutWithProduct>, ServiceError>;
    async fn find_stock_out(&self, id: Uuid) -> Result<Option<StockOutWithProduct>, ServiceError>;
    async fn find_stock_out_by_reference(&self, reference: &str) -> Result<Option<StockOutWithProduct>, ServiceError>;
}

pub struct SeaOrmStockLedgerRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmStockLedgerRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl StockLedgerRepository for SeaOrmStockLedgerRepository {
    async fn list_stock_in(&self, product_id: Option<Uuid>) -> Result<Vec<StockInWithProduct>, ServiceError> {
        let mut finder = stock_in::Entity::find();
        if let Some(pid) = product_id {
            finder = finder.filter(stock_in::Column::ProductId.eq(pid));
        }
        let rows = finder
            .find_also_related(product::Entity)
            .order_by_desc(stock_in::Column::Date)
            .order_by_desc(stock_in::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_stock_in(&self, id: Uuid) -> Result<Option<StockInWithProduct>, ServiceError> {
        let row = stock_in::Entity::find_by_id(id)
            .find_also_related(product::Entity)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(Into::into))
    }

    async fn find_stock_in_by_reference(&self, reference: &str) -> Result<Option<StockInWithProduct>, ServiceError> {
        let row = stock_in::Entity::find()
            .filter(stock_in::Column::Reference.eq(reference))
            .find_also_related(product::Entity)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(Into::into))
    }

    async fn list_stock_out(&self, product_id: Option<Uuid>) -> Result<Vec<StockOutWithProduct>, ServiceError> {
        let mut finder = stock_out::Entity::find();
        if let Some(pid) = product_id {
            finder = finder.filter(stock_out::Column::ProductId.eq(pid));
        }
        let rows = finder
            .find_also_related(product::Entity)
            .order_by_desc(stock_out::Column::Date)
            .order_by_desc(stock_out::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_stock_out(&self, id: Uuid) -> Result<Option<StockOutWithProduct>, ServiceError> {
        let row = stock_out::Entity::find_by_id(id)
            .find_also_related(product::Entity)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(Into::into))
    }

    async fn find_stock_out_by_reference(&self, reference: &str) -> Result<Option<StockOutWithProduct>, ServiceError> {
        let row = stock_out::Entity::find()
            .filter(stock_out::Column::Reference.eq(reference))
            .find_also_related(product::Entity)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(Into::into))
    }
}
