use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use models::product::{self, Entity as ProductEntity};

use super::domain::{NewProduct, ProductPatch, ProductQuery, StockStatus};
use crate::errors::{db_err, ServiceError};

/// Persistence for product rows. Quantity changes driven by the ledger go
/// through `stock::reconciler::QuantityReconciler`, not through here.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self, query: &ProductQuery) -> Result<Vec<product::Model>, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<product::Model>, ServiceError>;
    async fn find_by_product_id(&self, product_id: &str) -> Result<Option<product::Model>, ServiceError>;
    async fn create(&self, input: &NewProduct) -> Result<product::Model, ServiceError>;
    async fn update(&self, id: Uuid, patch: &ProductPatch) -> Result<product::Model, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmProductRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmProductRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

/// `LIKE` pattern (escape char `!`) matching `term` literally anywhere in the value.
fn contains_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.to_lowercase().chars() {
        match c {
            '!' | '%' | '_' => {
                out.push('!');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push('%');
    out
}

fn search_condition(term: &str) -> Condition {
    let pattern = contains_pattern(term);
    let lower_like = |col: product::Column| {
        Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern.clone()).escape('!'))
    };
    Condition::any()
        .add(lower_like(product::Column::ProductId))
        .add(lower_like(product::Column::Name))
        .add(lower_like(product::Column::Description))
}

#[async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn list(&self, query: &ProductQuery) -> Result<Vec<product::Model>, ServiceError> {
        let mut finder = ProductEntity::find();
        if let Some(category) = query.category_name() {
            finder = finder.filter(product::Column::Category.eq(category));
        }
        if let Some(term) = query.search_term() {
            finder = finder.filter(search_condition(term));
        }
        finder = match query.status {
            StockStatus::All => finder,
            StockStatus::InStock => finder.filter(Expr::col(product::Column::Quantity).gt(Expr::col(product::Column::MinStock))),
            StockStatus::LowStock => finder.filter(Expr::col(product::Column::Quantity).lte(Expr::col(product::Column::MinStock))),
            StockStatus::OutOfStock => finder.filter(product::Column::Quantity.eq(0)),
        };
        if query.orders_by_quantity() {
            finder = finder.order_by_asc(product::Column::Quantity);
        }
        let rows = finder
            .order_by_asc(Expr::expr(Func::lower(Expr::col(product::Column::Name))))
            .order_by_asc(product::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<product::Model>, ServiceError> {
        ProductEntity::find_by_id(id).one(&self.db).await.map_err(db_err)
    }

    async fn find_by_product_id(&self, product_id: &str) -> Result<Option<product::Model>, ServiceError> {
        ProductEntity::find()
            .filter(product::Column::ProductId.eq(product_id))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    async fn create(&self, input: &NewProduct) -> Result<product::Model, ServiceError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let am = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(input.product_id.trim().to_string()),
            name: Set(input.name.trim().to_string()),
            category: Set(input.category.trim().to_string()),
            unit: Set(input.unit.trim().to_string()),
            description: Set(input.description.clone()),
            price: Set(input.price),
            min_stock: Set(input.min_stock),
            quantity: Set(input.initial_stock),
            created_at: Set(now),
            updated_at: Set(now),
        };
        am.insert(&self.db).await.map_err(db_err)
    }

    async fn update(&self, id: Uuid, patch: &ProductPatch) -> Result<product::Model, ServiceError> {
        let current = ProductEntity::find_by_id(id).one(&self.db).await.map_err(db_err)?;
        let Some(existing) = current else { return Err(ServiceError::not_found("product")); };
        let mut am: product::ActiveModel = existing.into();
        if let Some(v) = &patch.product_id { am.product_id = Set(v.trim().to_string()); }
        if let Some(v) = &patch.name { am.name = Set(v.trim().to_string()); }
        if let Some(v) = &patch.category { am.category = Set(v.trim().to_string()); }
        if let Some(v) = &patch.unit { am.unit = Set(v.trim().to_string()); }
        if let Some(v) = &patch.description { am.description = Set(v.clone()); }
        if let Some(v) = patch.price { am.price = Set(v); }
        if let Some(v) = patch.min_stock { am.min_stock = Set(v); }
        if let Some(v) = patch.quantity { am.quantity = Set(v); }
        am.updated_at = Set(Utc::now().into());
        am.update(&self.db).await.map_err(db_err)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = ProductEntity::delete_by_id(id).exec(&self.db).await.map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }
}
