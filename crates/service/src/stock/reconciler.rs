//! Quantity reconciliation.
//!
//! Every ledger mutation and its matching `product.quantity` adjustment run in
//! one transaction. Decrements are conditional (`quantity >= n`), so a
//! concurrent writer that already consumed the stock makes the statement match
//! zero rows and the whole transaction rolls back instead of going negative.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use models::{product, stock_in, stock_out};

use super::domain::{NewStockIn, NewStockOut};
use crate::errors::{db_err, ServiceError};

/// Narrow capability the ledger services depend on instead of the product
/// service: read on-hand stock and apply/reverse movements atomically.
#[async_trait]
pub trait QuantityReconciler: Send + Sync {
    /// Current quantity, or `None` if the product does not exist.
    async fn on_hand(&self, product_id: Uuid) -> Result<Option<i32>, ServiceError>;
    /// Insert the stock-in row and increment the product.
    async fn apply_stock_in(&self, input: &NewStockIn) -> Result<stock_in::Model, ServiceError>;
    /// Delete the stock-in row and decrement the product by its quantity.
    async fn reverse_stock_in(&self, record: &stock_in::Model) -> Result<(), ServiceError>;
    /// Insert the stock-out row and decrement the product; rejects when short.
    async fn apply_stock_out(&self, input: &NewStockOut) -> Result<stock_out::Model, ServiceError>;
    /// Delete the stock-out row and restock the product by its quantity.
    async fn reverse_stock_out(&self, record: &stock_out::Model) -> Result<(), ServiceError>;
}

/// SeaORM-backed reconciler; one database transaction per operation.
pub struct SeaOrmQuantityReconciler {
    pub db: DatabaseConnection,
}

impl SeaOrmQuantityReconciler {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

/// `quantity += delta`, guarded by `quantity >= -delta` when decrementing and
/// by `quantity <= i32::MAX - delta` when incrementing.
/// Returns the number of product rows touched (0 or 1).
async fn shift_quantity<C: ConnectionTrait>(conn: &C, product_id: Uuid, delta: i32) -> Result<u64, ServiceError> {
    let mut update = product::Entity::update_many()
        .col_expr(product::Column::Quantity, Expr::col(product::Column::Quantity).add(delta))
        .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(product::Column::Id.eq(product_id));
    update = if delta < 0 {
        update.filter(product::Column::Quantity.gte(-delta))
    } else {
        update.filter(product::Column::Quantity.lte(i32::MAX - delta))
    };
    let res = update.exec(conn).await.map_err(db_err)?;
    Ok(res.rows_affected)
}

async fn quantity_of<C: ConnectionTrait>(conn: &C, product_id: Uuid) -> Result<Option<i32>, ServiceError> {
    let found = product::Entity::find_by_id(product_id).one(conn).await.map_err(db_err)?;
    Ok(found.map(|p| p.quantity))
}

/// Why a guarded `shift_quantity` matched no row.
async fn shift_rejected<C: ConnectionTrait>(conn: &C, product_id: Uuid, delta: i32) -> ServiceError {
    match quantity_of(conn, product_id).await {
        Ok(Some(available)) if delta < 0 => ServiceError::InsufficientStock { product_id, requested: -delta, available },
        Ok(Some(on_hand)) => ServiceError::quantity_overflow(delta, on_hand),
        Ok(None) => ServiceError::not_found("product"),
        Err(e) => e,
    }
}

#[async_trait]
impl QuantityReconciler for SeaOrmQuantityReconciler {
    async fn on_hand(&self, product_id: Uuid) -> Result<Option<i32>, ServiceError> {
        quantity_of(&self.db, product_id).await
    }

    #[instrument(skip(self, input), fields(reference = %input.reference, product_id = %input.product_id, quantity = input.quantity))]
    async fn apply_stock_in(&self, input: &NewStockIn) -> Result<stock_in::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let now: DateTimeWithTimeZone = Utc::now().into();
        let am = stock_in::ActiveModel {
            id: Set(Uuid::new_v4()),
            reference: Set(input.reference.trim().to_string()),
            date: Set(input.recorded_at()),
            supplier: Set(input.supplier.trim().to_string()),
            notes: Set(input.notes.clone()),
            quantity: Set(input.quantity),
            unit_price: Set(input.unit_price),
            product_id: Set(input.product_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = am.insert(&txn).await.map_err(db_err)?;
        if shift_quantity(&txn, input.product_id, input.quantity).await? == 0 {
            // dropping `txn` rolls back the insert
            let err = shift_rejected(&txn, input.product_id, input.quantity).await;
            warn!(error = %err, "stock_in_rejected");
            return Err(err);
        }
        txn.commit().await.map_err(db_err)?;
        info!(id = %created.id, "stock_in_applied");
        Ok(created)
    }

    #[instrument(skip(self, record), fields(id = %record.id, product_id = %record.product_id, quantity = record.quantity))]
    async fn reverse_stock_in(&self, record: &stock_in::Model) -> Result<(), ServiceError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let res = stock_in::Entity::delete_by_id(record.id).exec(&txn).await.map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("stock_in"));
        }
        if shift_quantity(&txn, record.product_id, -record.quantity).await? == 0 {
            let err = shift_rejected(&txn, record.product_id, -record.quantity).await;
            warn!(error = %err, "stock_in_reversal_rejected");
            return Err(err);
        }
        txn.commit().await.map_err(db_err)?;
        info!("stock_in_reversed");
        Ok(())
    }

    #[instrument(skip(self, input), fields(reference = %input.reference, product_id = %input.product_id, quantity = input.quantity))]
    async fn apply_stock_out(&self, input: &NewStockOut) -> Result<stock_out::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let available = quantity_of(&txn, input.product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product"))?;
        if input.quantity > available {
            debug!(available, "stock_out_precheck_failed");
            return Err(ServiceError::InsufficientStock { product_id: input.product_id, requested: input.quantity, available });
        }
        let now: DateTimeWithTimeZone = Utc::now().into();
        let am = stock_out::ActiveModel {
            id: Set(Uuid::new_v4()),
            reference: Set(input.reference.trim().to_string()),
            date: Set(input.recorded_at()),
            department: Set(input.department.trim().to_string()),
            requester: Set(input.requester.trim().to_string()),
            notes: Set(input.notes.clone()),
            quantity: Set(input.quantity),
            unit_price: Set(input.unit_price),
            product_id: Set(input.product_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = am.insert(&txn).await.map_err(db_err)?;
        if shift_quantity(&txn, input.product_id, -input.quantity).await? == 0 {
            let err = shift_rejected(&txn, input.product_id, -input.quantity).await;
            warn!(error = %err, "stock_out_lost_race");
            return Err(err);
        }
        txn.commit().await.map_err(db_err)?;
        info!(id = %created.id, "stock_out_applied");
        Ok(created)
    }

    #[instrument(skip(self, record), fields(id = %record.id, product_id = %record.product_id, quantity = record.quantity))]
    async fn reverse_stock_out(&self, record: &stock_out::Model) -> Result<(), ServiceError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let res = stock_out::Entity::delete_by_id(record.id).exec(&txn).await.map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("stock_out"));
        }
        if shift_quantity(&txn, record.product_id, record.quantity).await? == 0 {
            return Err(shift_rejected(&txn, record.product_id, record.quantity).await);
        }
        txn.commit().await.map_err(db_err)?;
        info!("stock_out_reversed");
        Ok(())
    }
}
