use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use common::metrics::{record_stock_movement, STOCK_OUT_REJECTED_TOTAL};
use models::{stock_in, stock_out};

use super::domain::{NewStockIn, NewStockOut, StockInWithProduct, StockOutWithProduct};
use super::reconciler::QuantityReconciler;
use super::repository::StockLedgerRepository;
use crate::errors::ServiceError;

/// Stock-in ledger: validation and lookups in front of the reconciler.
pub struct StockInService<L: StockLedgerRepository + ?Sized, Q: QuantityReconciler + ?Sized> {
    ledger: Arc<L>,
    reconciler: Arc<Q>,
}

impl<L: StockLedgerRepository + ?Sized, Q: QuantityReconciler + ?Sized> StockInService<L, Q> {
    pub fn new(ledger: Arc<L>, reconciler: Arc<Q>) -> Self { Self { ledger, reconciler } }

    /// Record a receipt and increment the product's quantity.
    ///
    /// # Examples
    /// ```
    /// use service::mock::MockInventory;
    /// use service::product::{ProductService, domain::NewProduct};
    /// use service::stock::{StockInService, domain::NewStockIn};
    /// use rust_decimal::Decimal;
    /// use std::sync::Arc;
    /// let inv = Arc::new(MockInventory::default());
    /// let products = ProductService::new(inv.clone());
    /// let stock_in = StockInService::new(inv.clone(), inv.clone());
    /// let p = tokio_test::block_on(products.create(NewProduct {
    ///     product_id: "P001".into(), name: "Paper".into(), category: "Stationery".into(),
    ///     unit: "ream".into(), description: None, price: Decimal::new(450, 2), min_stock: 10, initial_stock: 100,
    /// })).unwrap();
    /// tokio_test::block_on(stock_in.create(NewStockIn {
    ///     reference: "IN-1".into(), date: None, supplier: "Acme".into(), notes: None,
    ///     quantity: 20, unit_price: Decimal::new(400, 2), product_id: p.id,
    /// })).unwrap();
    /// assert_eq!(tokio_test::block_on(products.find_one(p.id)).unwrap().quantity, 120);
    /// ```
    #[instrument(skip(self, input), fields(reference = %input.reference, product_id = %input.product_id))]
    pub async fn create(&self, input: NewStockIn) -> Result<stock_in::Model, ServiceError> {
        input.validate()?;
        let reference = input.reference.trim();
        if self.ledger.find_stock_in_by_reference(reference).await?.is_some() {
            return Err(ServiceError::conflict("stock_in", "reference", reference));
        }
        if self.reconciler.on_hand(input.product_id).await?.is_none() {
            return Err(ServiceError::not_found("product"));
        }
        let created = self.reconciler.apply_stock_in(&input).await?;
        record_stock_movement("stock_in", "apply");
        info!(id = %created.id, quantity = created.quantity, "stock_in_created");
        Ok(created)
    }

    pub async fn find_all(&self) -> Result<Vec<StockInWithProduct>, ServiceError> {
        self.ledger.list_stock_in(None).await
    }

    pub async fn find_by_product(&self, product_id: Uuid) -> Result<Vec<StockInWithProduct>, ServiceError> {
        self.ledger.list_stock_in(Some(product_id)).await
    }

    pub async fn find_one(&self, id: Uuid) -> Result<StockInWithProduct, ServiceError> {
        self.ledger.find_stock_in(id).await?.ok_or_else(|| ServiceError::not_found("stock_in"))
    }

    pub async fn find_by_reference(&self, reference: &str) -> Result<StockInWithProduct, ServiceError> {
        self.ledger
            .find_stock_in_by_reference(reference.trim())
            .await?
            .ok_or_else(|| ServiceError::not_found("stock_in"))
    }

    /// Delete the row and take its quantity back off the product.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove(&self, id: Uuid) -> Result<StockInWithProduct, ServiceError> {
        let existing = self.find_one(id).await?;
        self.reconciler.reverse_stock_in(&existing.entry).await?;
        record_stock_movement("stock_in", "reverse");
        info!(reference = %existing.entry.reference, quantity = existing.entry.quantity, "stock_in_removed");
        Ok(existing)
    }
}

/// Stock-out ledger: validation, sufficiency check and lookups in front of
/// the reconciler.
pub struct StockOutService<L: StockLedgerRepository + ?Sized, Q: QuantityReconciler + ?Sized> {
    ledger: Arc<L>,
    reconciler: Arc<Q>,
}

impl<L: StockLedgerRepository + ?Sized, Q: QuantityReconciler + ?Sized> StockOutService<L, Q> {
    pub fn new(ledger: Arc<L>, reconciler: Arc<Q>) -> Self { Self { ledger, reconciler } }

    #[instrument(skip(self, input), fields(reference = %input.reference, product_id = %input.product_id))]
    pub async fn create(&self, input: NewStockOut) -> Result<stock_out::Model, ServiceError> {
        input.validate()?;
        let reference = input.reference.trim();
        if self.ledger.find_stock_out_by_reference(reference).await?.is_some() {
            return Err(ServiceError::conflict("stock_out", "reference", reference));
        }
        let available = self
            .reconciler
            .on_hand(input.product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product"))?;
        if input.quantity > available {
            STOCK_OUT_REJECTED_TOTAL.inc();
            warn!(requested = input.quantity, available, "stock_out_rejected");
            return Err(ServiceError::InsufficientStock {
                product_id: input.product_id,
                requested: input.quantity,
                available,
            });
        }
        let created = match self.reconciler.apply_stock_out(&input).await {
            Ok(created) => created,
            Err(e @ ServiceError::InsufficientStock { .. }) => {
                STOCK_OUT_REJECTED_TOTAL.inc();
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        record_stock_movement("stock_out", "apply");
        info!(id = %created.id, quantity = created.quantity, "stock_out_created");
        Ok(created)
    }

    pub async fn find_all(&self) -> Result<Vec<StockOutWithProduct>, ServiceError> {
        self.ledger.list_stock_out(None).await
    }

    pub async fn find_by_product(&self, product_id: Uuid) -> Result<Vec<StockOutWithProduct>, ServiceError> {
        self.ledger.list_stock_out(Some(product_id)).await
    }

    pub async fn find_one(&self, id: Uuid) -> Result<StockOutWithProduct, ServiceError> {
        self.ledger.find_stock_out(id).await?.ok_or_else(|| ServiceError::not_found("stock_out"))
    }

    pub async fn find_by_reference(&self, reference: &str) -> Result<StockOutWithProduct, ServiceError> {
        self.ledger
            .find_stock_out_by_reference(reference.trim())
            .await?
            .ok_or_else(|| ServiceError::not_found("stock_out"))
    }

    /// Delete the row and restock the product.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove(&self, id: Uuid) -> Result<StockOutWithProduct, ServiceError> {
        let existing = self.find_one(id).await?;
        self.reconciler.reverse_stock_out(&existing.entry).await?;
        record_stock_movement("stock_out", "reverse");
        info!(reference = %existing.entry.reference, quantity = existing.entry.quantity, "stock_out_removed");
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockInventory;
    use crate::product::{domain::NewProduct, ProductService};
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    struct Fixture {
        products: ProductService<MockInventory>,
        stock_in: StockInService<MockInventory, MockInventory>,
        stock_out: StockOutService<MockInventory, MockInventory>,
    }

    fn fixture() -> Fixture {
        let inv = Arc::new(MockInventory::default());
        Fixture {
            products: ProductService::new(inv.clone()),
            stock_in: StockInService::new(inv.clone(), inv.clone()),
            stock_out: StockOutService::new(inv.clone(), inv),
        }
    }

    async fn product(f: &Fixture, code: &str, initial_stock: i32) -> Uuid {
        f.products
            .create(NewProduct {
                product_id: code.into(),
                name: format!("Item {}", code),
                category: "Stationery".into(),
                unit: "pcs".into(),
                description: None,
                price: Decimal::new(250, 2),
                min_stock: 10,
                initial_stock,
            })
            .await
            .unwrap()
            .id
    }

    fn receipt(reference: &str, product_id: Uuid, quantity: i32) -> NewStockIn {
        NewStockIn {
            reference: reference.into(),
            date: None,
            supplier: "Acme Supplies".into(),
            notes: None,
            quantity,
            unit_price: Decimal::new(200, 2),
            product_id,
        }
    }

    fn issue(reference: &str, product_id: Uuid, quantity: i32) -> NewStockOut {
        NewStockOut {
            reference: reference.into(),
            date: None,
            department: "Finance".into(),
            requester: "Jordan".into(),
            notes: None,
            quantity,
            unit_price: Decimal::ZERO,
            product_id,
        }
    }

    async fn quantity(f: &Fixture, id: Uuid) -> i32 {
        f.products.find_one(id).await.unwrap().quantity
    }

    #[tokio::test]
    async fn receipt_and_reversal_track_quantity() {
        let f = fixture();
        let pid = product(&f, "P001", 100).await;

        let si = f.stock_in.create(receipt("IN-001", pid, 20)).await.unwrap();
        assert_eq!(quantity(&f, pid).await, 120);

        let removed = f.stock_in.remove(si.id).await.unwrap();
        assert_eq!(removed.entry.quantity, 20);
        assert_eq!(quantity(&f, pid).await, 100);

        assert!(matches!(f.stock_in.remove(si.id).await.unwrap_err(), ServiceError::NotFound(_)));
        assert_eq!(quantity(&f, pid).await, 100);
    }

    #[tokio::test]
    async fn stock_out_beyond_on_hand_is_rejected_without_change() {
        let f = fixture();
        let pid = product(&f, "P002", 5).await;

        let err = f.stock_out.create(issue("OUT-001", pid, 10)).await.unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientStock { requested: 10, available: 5, .. }));
        assert_eq!(quantity(&f, pid).await, 5);
        assert!(f.stock_out.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stock_out_of_exactly_on_hand_empties_product() {
        let f = fixture();
        let pid = product(&f, "P003", 7).await;
        f.stock_out.create(issue("OUT-002", pid, 7)).await.unwrap();
        assert_eq!(quantity(&f, pid).await, 0);
        let out: Vec<_> = f.products.find_out_of_stock().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(out, vec![pid]);
    }

    #[tokio::test]
    async fn duplicate_reference_leaves_quantity_alone() {
        let f = fixture();
        let pid = product(&f, "P004", 10).await;
        f.stock_in.create(receipt("DUP-1", pid, 5)).await.unwrap();
        let err = f.stock_in.create(receipt("DUP-1", pid, 5)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(quantity(&f, pid).await, 15);

        f.stock_out.create(issue("DUP-2", pid, 1)).await.unwrap();
        let err = f.stock_out.create(issue("DUP-2", pid, 1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(quantity(&f, pid).await, 14);
    }

    #[tokio::test]
    async fn unknown_product_and_bad_input_are_rejected() {
        let f = fixture();
        let err = f.stock_in.create(receipt("IN-X", Uuid::new_v4(), 1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let err = f.stock_out.create(issue("OUT-X", Uuid::new_v4(), 1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let pid = product(&f, "P005", 3).await;
        assert!(matches!(f.stock_in.create(receipt("IN-0", pid, 0)).await.unwrap_err(), ServiceError::Model(_)));
        assert!(matches!(f.stock_in.create(receipt("  ", pid, 1)).await.unwrap_err(), ServiceError::Model(_)));
        let mut bad = issue("OUT-0", pid, 1);
        bad.requester = String::new();
        assert!(matches!(f.stock_out.create(bad).await.unwrap_err(), ServiceError::Model(_)));
        assert_eq!(quantity(&f, pid).await, 3);
    }

    #[tokio::test]
    async fn receipt_overflowing_quantity_is_a_validation_error() {
        let f = fixture();
        let pid = product(&f, "P007", 1).await;
        let err = f.stock_in.create(receipt("IN-MAX", pid, i32::MAX)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(quantity(&f, pid).await, 1);
        assert!(f.stock_in.find_all().await.unwrap().is_empty());

        // same guard when a reversed issue would restock past the maximum
        let full = product(&f, "P008", i32::MAX - 1).await;
        let so = f.stock_out.create(issue("OUT-MAX", full, 1)).await.unwrap();
        f.stock_in.create(receipt("IN-TOP", full, 2)).await.unwrap();
        assert!(matches!(f.stock_out.remove(so.id).await.unwrap_err(), ServiceError::Validation(_)));
        assert_eq!(quantity(&f, full).await, i32::MAX);
    }

    #[tokio::test]
    async fn reversing_a_consumed_receipt_cannot_go_negative() {
        let f = fixture();
        let pid = product(&f, "P006", 0).await;
        let si = f.stock_in.create(receipt("IN-6", pid, 10)).await.unwrap();
        f.stock_out.create(issue("OUT-6", pid, 8)).await.unwrap();

        let err = f.stock_in.remove(si.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientStock { .. }));
        assert_eq!(quantity(&f, pid).await, 2);
        assert!(f.stock_in.find_one(si.id).await.is_ok());
    }

    #[tokio::test]
    async fn quantity_matches_ledger_after_mixed_sequence() {
        let f = fixture();
        let initial = 30;
        let pid = product(&f, "P007", initial).await;

        let a = f.stock_in.create(receipt("IN-a", pid, 12)).await.unwrap();
        f.stock_in.create(receipt("IN-b", pid, 4)).await.unwrap();
        let c = f.stock_out.create(issue("OUT-c", pid, 20)).await.unwrap();
        f.stock_out.create(issue("OUT-d", pid, 6)).await.unwrap();
        let _ = f.stock_out.create(issue("OUT-e", pid, 100)).await;
        f.stock_out.remove(c.id).await.unwrap();
        f.stock_in.remove(a.id).await.unwrap();

        let ins: i32 = f.stock_in.find_by_product(pid).await.unwrap().iter().map(|r| r.entry.quantity).sum();
        let outs: i32 = f.stock_out.find_by_product(pid).await.unwrap().iter().map(|r| r.entry.quantity).sum();
        assert_eq!(quantity(&f, pid).await, initial + ins - outs);
        assert_eq!(quantity(&f, pid).await, 28);
    }

    #[tokio::test]
    async fn listings_are_newest_first_with_product_joined() {
        let f = fixture();
        let p1 = product(&f, "P008", 0).await;
        let p2 = product(&f, "P009", 0).await;
        let now = Utc::now();
        let mut older = receipt("IN-old", p1, 1);
        older.date = Some((now - Duration::days(2)).into());
        let mut newer = receipt("IN-new", p2, 1);
        newer.date = Some((now - Duration::days(1)).into());
        f.stock_in.create(older).await.unwrap();
        f.stock_in.create(newer).await.unwrap();

        let all = f.stock_in.find_all().await.unwrap();
        let refs: Vec<_> = all.iter().map(|r| r.entry.reference.as_str()).collect();
        assert_eq!(refs, vec!["IN-new", "IN-old"]);
        assert_eq!(all[0].product.as_ref().map(|p| p.product_id.as_str()), Some("P009"));

        let only_p1 = f.stock_in.find_by_product(p1).await.unwrap();
        assert_eq!(only_p1.len(), 1);
        assert_eq!(f.stock_in.find_by_reference("IN-old").await.unwrap().entry.product_id, p1);
        assert!(matches!(f.stock_in.find_by_reference("nope").await.unwrap_err(), ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn deleting_product_drops_its_ledger_rows() {
        let f = fixture();
        let pid = product(&f, "P010", 5).await;
        f.stock_in.create(receipt("IN-10", pid, 5)).await.unwrap();
        f.stock_out.create(issue("OUT-10", pid, 2)).await.unwrap();
        f.products.remove(pid).await.unwrap();
        assert!(f.stock_in.find_all().await.unwrap().is_empty());
        assert!(f.stock_out.find_all().await.unwrap().is_empty());
    }
}
