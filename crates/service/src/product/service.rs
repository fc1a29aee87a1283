use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use models::product;

use super::domain::{InventorySummary, NewProduct, ProductPatch, ProductQuery, StockStatus};
use super::repository::ProductRepository;
use crate::errors::ServiceError;

/// Application service for products: validation and uniqueness rules on top
/// of a `ProductRepository`.
pub struct ProductService<R: ProductRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: ProductRepository + ?Sized> ProductService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Create a product; `quantity` is seeded from `initial_stock`.
    ///
    /// # Examples
    /// ```
    /// use service::mock::MockInventory;
    /// use service::product::{ProductService, domain::NewProduct};
    /// use rust_decimal::Decimal;
    /// use std::sync::Arc;
    /// let svc = ProductService::new(Arc::new(MockInventory::default()));
    /// let input = NewProduct {
    ///     product_id: "P001".into(), name: "Stapler".into(), category: "Stationery".into(),
    ///     unit: "pcs".into(), description: None, price: Decimal::new(1200, 2), min_stock: 10, initial_stock: 50,
    /// };
    /// let p = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(p.quantity, 50);
    /// ```
    #[instrument(skip(self, input), fields(product_id = %input.product_id))]
    pub async fn create(&self, input: NewProduct) -> Result<product::Model, ServiceError> {
        product::validate_product_code(&input.product_id)?;
        product::validate_name(&input.name)?;
        product::validate_category(&input.category)?;
        product::validate_unit(&input.unit)?;
        product::validate_price(input.price)?;
        product::validate_min_stock(input.min_stock)?;
        if input.initial_stock < 0 {
            return Err(ServiceError::Validation("initialStock must be >= 0".into()));
        }
        let code = input.product_id.trim();
        if self.repo.find_by_product_id(code).await?.is_some() {
            return Err(ServiceError::conflict("product", "productId", code));
        }
        let created = self.repo.create(&input).await?;
        info!(id = %created.id, product_id = %created.product_id, quantity = created.quantity, "product_created");
        Ok(created)
    }

    pub async fn find_all(&self) -> Result<Vec<product::Model>, ServiceError> {
        self.repo.list(&ProductQuery::default()).await
    }

    /// Combined listing used by `GET /products`.
    pub async fn list(&self, query: &ProductQuery) -> Result<Vec<product::Model>, ServiceError> {
        self.repo.list(query).await
    }

    pub async fn find_one(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("product"))
    }

    pub async fn find_by_product_id(&self, product_id: &str) -> Result<product::Model, ServiceError> {
        self.repo
            .find_by_product_id(product_id.trim())
            .await?
            .ok_or_else(|| ServiceError::not_found("product"))
    }

    pub async fn find_by_category(&self, category: &str) -> Result<Vec<product::Model>, ServiceError> {
        self.repo.list(&ProductQuery::category(category)).await
    }

    pub async fn search(&self, term: &str) -> Result<Vec<product::Model>, ServiceError> {
        self.repo.list(&ProductQuery::search(term)).await
    }

    pub async fn find_low_stock(&self) -> Result<Vec<product::Model>, ServiceError> {
        self.repo.list(&ProductQuery::status(StockStatus::LowStock)).await
    }

    pub async fn find_out_of_stock(&self) -> Result<Vec<product::Model>, ServiceError> {
        self.repo.list(&ProductQuery::status(StockStatus::OutOfStock)).await
    }

    pub async fn find_in_stock(&self) -> Result<Vec<product::Model>, ServiceError> {
        self.repo.list(&ProductQuery::status(StockStatus::InStock)).await
    }

    pub async fn summary(&self) -> Result<InventorySummary, ServiceError> {
        let rows = self.find_all().await?;
        Ok(InventorySummary::from_products(&rows))
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<product::Model, ServiceError> {
        let existing = self.find_one(id).await?;
        if let Some(v) = &patch.product_id { product::validate_product_code(v)?; }
        if let Some(v) = &patch.name { product::validate_name(v)?; }
        if let Some(v) = &patch.category { product::validate_category(v)?; }
        if let Some(v) = &patch.unit { product::validate_unit(v)?; }
        if let Some(v) = patch.price { product::validate_price(v)?; }
        if let Some(v) = patch.min_stock { product::validate_min_stock(v)?; }
        if let Some(v) = patch.quantity { product::validate_quantity(v)?; }

        if let Some(code) = patch.product_id.as_deref().map(str::trim) {
            if code != existing.product_id {
                if let Some(other) = self.repo.find_by_product_id(code).await? {
                    if other.id != id {
                        return Err(ServiceError::conflict("product", "productId", code));
                    }
                }
            }
        }
        let updated = self.repo.update(id, &patch).await?;
        info!(id = %updated.id, product_id = %updated.product_id, "product_updated");
        Ok(updated)
    }

    /// Delete unconditionally; ledger rows go with it through the FK cascade.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        let existing = self.find_one(id).await?;
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("product"));
        }
        info!(id = %existing.id, product_id = %existing.product_id, "product_deleted");
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockInventory;
    use rust_decimal::Decimal;

    fn new_product(code: &str, name: &str, category: &str, min_stock: i32, initial_stock: i32) -> NewProduct {
        NewProduct {
            product_id: code.into(),
            name: name.into(),
            category: category.into(),
            unit: "pcs".into(),
            description: None,
            price: Decimal::new(1200, 2),
            min_stock,
            initial_stock,
        }
    }

    fn service() -> ProductService<MockInventory> {
        ProductService::new(Arc::new(MockInventory::default()))
    }

    #[tokio::test]
    async fn create_rejects_duplicate_product_code() {
        let svc = service();
        svc.create(new_product("P001", "Stapler", "Stationery", 10, 50)).await.unwrap();
        let err = svc.create(new_product("P001", "Other", "Stationery", 1, 1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_validates_fields() {
        let svc = service();
        let mut bad = new_product("P002", "Pen", "Stationery", 0, 0);
        bad.price = Decimal::new(-1, 0);
        assert!(matches!(svc.create(bad).await.unwrap_err(), ServiceError::Model(_)));
        let bad = new_product("P003", "Pen", "Stationery", 0, -5);
        assert!(matches!(svc.create(bad).await.unwrap_err(), ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn low_and_out_of_stock_views() {
        let svc = service();
        svc.create(new_product("P1", "Toner", "Printing", 5, 5)).await.unwrap();
        svc.create(new_product("P2", "Paper", "Printing", 10, 0)).await.unwrap();
        svc.create(new_product("P3", "Binder", "Stationery", 2, 40)).await.unwrap();
        svc.create(new_product("P4", "Clips", "Stationery", 20, 3)).await.unwrap();

        let low: Vec<_> = svc.find_low_stock().await.unwrap().into_iter().map(|p| (p.product_id, p.quantity)).collect();
        assert_eq!(low, vec![("P2".to_string(), 0), ("P4".to_string(), 3), ("P1".to_string(), 5)]);

        let out: Vec<_> = svc.find_out_of_stock().await.unwrap().into_iter().map(|p| p.product_id).collect();
        assert_eq!(out, vec!["P2".to_string()]);

        let in_stock: Vec<_> = svc.find_in_stock().await.unwrap().into_iter().map(|p| p.product_id).collect();
        assert_eq!(in_stock, vec!["P3".to_string()]);
    }

    #[tokio::test]
    async fn category_and_search_are_alphabetical() {
        let svc = service();
        svc.create(new_product("ST-2", "Stapler", "Stationery", 1, 1)).await.unwrap();
        svc.create(new_product("ST-1", "Envelope", "Stationery", 1, 1)).await.unwrap();
        let mut toner = new_product("PR-1", "Toner", "Printing", 1, 1);
        toner.description = Some("Black cartridge for the STAPLES printer".into());
        svc.create(toner).await.unwrap();

        let names: Vec<_> = svc.find_by_category("Stationery").await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Envelope".to_string(), "Stapler".to_string()]);

        let hits: Vec<_> = svc.search("stapl").await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(hits, vec!["Stapler".to_string(), "Toner".to_string()]);

        let by_code: Vec<_> = svc.search("pr-").await.unwrap().into_iter().map(|p| p.product_id).collect();
        assert_eq!(by_code, vec!["PR-1".to_string()]);
    }

    #[tokio::test]
    async fn update_rejects_taken_product_code() {
        let svc = service();
        let a = svc.create(new_product("A1", "Alpha", "X", 1, 1)).await.unwrap();
        svc.create(new_product("B1", "Beta", "X", 1, 1)).await.unwrap();

        let err = svc
            .update(a.id, ProductPatch { product_id: Some("B1".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // Keeping its own code is not a conflict
        let same = svc
            .update(a.id, ProductPatch { product_id: Some("A1".into()), name: Some("Alpha 2".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(same.name, "Alpha 2");
    }

    #[tokio::test]
    async fn names_order_ignores_case() {
        let svc = service();
        svc.create(new_product("C1", "banana", "Fruit", 0, 1)).await.unwrap();
        svc.create(new_product("C2", "Apple", "Fruit", 0, 1)).await.unwrap();
        svc.create(new_product("C3", "cherry", "Fruit", 0, 1)).await.unwrap();
        let names: Vec<_> = svc.find_by_category("Fruit").await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Apple".to_string(), "banana".to_string(), "cherry".to_string()]);
    }

    #[tokio::test]
    async fn patch_distinguishes_null_from_absent_description() {
        let svc = service();
        let mut input = new_product("N1", "Notebook", "Stationery", 0, 1);
        input.description = Some("A5 ruled".into());
        let p = svc.create(input).await.unwrap();

        let untouched: ProductPatch = serde_json::from_str(r#"{"name": "Notebook A5"}"#).unwrap();
        assert_eq!(svc.update(p.id, untouched).await.unwrap().description.as_deref(), Some("A5 ruled"));

        let cleared: ProductPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(svc.update(p.id, cleared).await.unwrap().description, None);

        let set: ProductPatch = serde_json::from_str(r#"{"description": "dotted"}"#).unwrap();
        assert_eq!(svc.update(p.id, set).await.unwrap().description.as_deref(), Some("dotted"));
    }

    #[tokio::test]
    async fn remove_then_lookup_is_not_found() {
        let svc = service();
        let p = svc.create(new_product("D1", "Desk", "Furniture", 0, 2)).await.unwrap();
        svc.remove(p.id).await.unwrap();
        assert!(matches!(svc.find_one(p.id).await.unwrap_err(), ServiceError::NotFound(_)));
        assert!(matches!(svc.remove(p.id).await.unwrap_err(), ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn summary_counts_and_values() {
        let svc = service();
        svc.create(new_product("S1", "A", "X", 5, 10)).await.unwrap();
        svc.create(new_product("S2", "B", "X", 5, 0)).await.unwrap();
        let s = svc.summary().await.unwrap();
        assert_eq!(s.total_products, 2);
        assert_eq!(s.low_stock, 1);
        assert_eq!(s.out_of_stock, 1);
        assert_eq!(s.total_quantity, 10);
        assert_eq!(s.total_value, Decimal::new(12000, 2));
    }
}
