//! In-memory inventory for tests and doc examples.
//!
//! One `MockInventory` plays every persistence role (products, ledgers and
//! reconciler) over a single mutex, which gives it the same all-or-nothing
//! behaviour as the database transaction.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use models::{product, stock_in, stock_out};

use crate::errors::ServiceError;
use crate::product::domain::{NewProduct, ProductPatch, ProductQuery};
use crate::product::repository::ProductRepository;
use crate::stock::domain::{NewStockIn, NewStockOut, StockInWithProduct, StockOutWithProduct, WithProduct};
use crate::stock::reconciler::QuantityReconciler;
use crate::stock::repository::StockLedgerRepository;

#[derive(Default)]
struct State {
    products: HashMap<Uuid, product::Model>,
    stock_in: HashMap<Uuid, stock_in::Model>,
    stock_out: HashMap<Uuid, stock_out::Model>,
}

impl State {
    fn joined<T: Clone>(&self, entry: &T, product_id: Uuid) -> WithProduct<T> {
        WithProduct { entry: entry.clone(), product: self.products.get(&product_id).cloned() }
    }

    fn shift(&mut self, product_id: Uuid, delta: i32) -> Result<(), ServiceError> {
        let p = self.products.get_mut(&product_id).ok_or_else(|| ServiceError::not_found("product"))?;
        let next = p.quantity.checked_add(delta).ok_or_else(|| ServiceError::quantity_overflow(delta, p.quantity))?;
        if next < 0 {
            return Err(ServiceError::InsufficientStock { product_id, requested: -delta, available: p.quantity });
        }
        p.quantity = next;
        p.updated_at = Utc::now().into();
        Ok(())
    }
}

#[derive(Default)]
pub struct MockInventory {
    state: Mutex<State>,
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

#[async_trait]
impl ProductRepository for MockInventory {
    async fn list(&self, query: &ProductQuery) -> Result<Vec<product::Model>, ServiceError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<_> = state.products.values().filter(|p| query.matches(p)).cloned().collect();
        query.sort(&mut rows);
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<product::Model>, ServiceError> {
        Ok(self.state.lock().unwrap().products.get(&id).cloned())
    }

    async fn find_by_product_id(&self, product_id: &str) -> Result<Option<product::Model>, ServiceError> {
        let state = self.state.lock().unwrap();
        Ok(state.products.values().find(|p| p.product_id == product_id).cloned())
    }

    async fn create(&self, input: &NewProduct) -> Result<product::Model, ServiceError> {
        let mut state = self.state.lock().unwrap();
        let code = input.product_id.trim();
        if state.products.values().any(|p| p.product_id == code) {
            return Err(ServiceError::conflict("product", "productId", code));
        }
        let ts = now();
        let model = product::Model {
            id: Uuid::new_v4(),
            product_id: code.to_string(),
            name: input.name.trim().to_string(),
            category: input.category.trim().to_string(),
            unit: input.unit.trim().to_string(),
            description: input.description.clone(),
            price: input.price,
            min_stock: input.min_stock,
            quantity: input.initial_stock,
            created_at: ts,
            updated_at: ts,
        };
        state.products.insert(model.id, model.clone());
        Ok(model)
    }

    async fn update(&self, id: Uuid, patch: &ProductPatch) -> Result<product::Model, ServiceError> {
        let mut state = self.state.lock().unwrap();
        let p = state.products.get_mut(&id).ok_or_else(|| ServiceError::not_found("product"))?;
        if let Some(v) = &patch.product_id { p.product_id = v.trim().to_string(); }
        if let Some(v) = &patch.name { p.name = v.trim().to_string(); }
        if let Some(v) = &patch.category { p.category = v.trim().to_string(); }
        if let Some(v) = &patch.unit { p.unit = v.trim().to_string(); }
        if let Some(v) = &patch.description { p.description = v.clone(); }
        if let Some(v) = patch.price { p.price = v; }
        if let Some(v) = patch.min_stock { p.min_stock = v; }
        if let Some(v) = patch.quantity { p.quantity = v; }
        p.updated_at = now();
        Ok(p.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut state = self.state.lock().unwrap();
        if state.products.remove(&id).is_none() {
            return Ok(false);
        }
        // same effect as the ON DELETE CASCADE foreign keys
        state.stock_in.retain(|_, r| r.product_id != id);
        state.stock_out.retain(|_, r| r.product_id != id);
        Ok(true)
    }
}

#[async_trait]
impl StockLedgerRepository for MockInventory {
    async fn list_stock_in(&self, product_id: Option<Uuid>) -> Result<Vec<StockInWithProduct>, ServiceError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<_> = state
            .stock_in
            .values()
            .filter(|r| product_id.map_or(true, |pid| r.product_id == pid))
            .map(|r| state.joined(r, r.product_id))
            .collect();
        rows.sort_by(|a, b| b.entry.date.cmp(&a.entry.date).then_with(|| b.entry.created_at.cmp(&a.entry.created_at)));
        Ok(rows)
    }

    async fn find_stock_in(&self, id: Uuid) -> Result<Option<StockInWithProduct>, ServiceError> {
        let state = self.state.lock().unwrap();
        Ok(state.stock_in.get(&id).map(|r| state.joined(r, r.product_id)))
    }

    async fn find_stock_in_by_reference(&self, reference: &str) -> Result<Option<StockInWithProduct>, ServiceError> {
        let state = self.state.lock().unwrap();
        Ok(state.stock_in.values().find(|r| r.reference == reference).map(|r| state.joined(r, r.product_id)))
    }

    async fn list_stock_out(&self, product_id: Option<Uuid>) -> Result<Vec<StockOutWithProduct>, ServiceError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<_> = state
            .stock_out
            .values()
            .filter(|r| product_id.map_or(true, |pid| r.product_id == pid))
            .map(|r| state.joined(r, r.product_id))
            .collect();
        rows.sort_by(|a, b| b.entry.date.cmp(&a.entry.date).then_with(|| b.entry.created_at.cmp(&a.entry.created_at)));
        Ok(rows)
    }

    async fn find_stock_out(&self, id: Uuid) -> Result<Option<StockOutWithProduct>, ServiceError> {
        let state = self.state.lock().unwrap();
        Ok(state.stock_out.get(&id).map(|r| state.joined(r, r.product_id)))
    }

    async fn find_stock_out_by_reference(&self, reference: &str) -> Result<Option<StockOutWithProduct>, ServiceError> {
        let state = self.state.lock().unwrap();
        Ok(state.stock_out.values().find(|r| r.reference == reference).map(|r| state.joined(r, r.product_id)))
    }
}

#[async_trait]
impl QuantityReconciler for MockInventory {
    async fn on_hand(&self, product_id: Uuid) -> Result<Option<i32>, ServiceError> {
        Ok(self.state.lock().unwrap().products.get(&product_id).map(|p| p.quantity))
    }

    async fn apply_stock_in(&self, input: &NewStockIn) -> Result<stock_in::Model, ServiceError> {
        let mut state = self.state.lock().unwrap();
        let reference = input.reference.trim();
        if state.stock_in.values().any(|r| r.reference == reference) {
            return Err(ServiceError::conflict("stock_in", "reference", reference));
        }
        state.shift(input.product_id, input.quantity)?;
        let ts = now();
        let model = stock_in::Model {
            id: Uuid::new_v4(),
            reference: reference.to_string(),
            date: input.recorded_at(),
            supplier: input.supplier.trim().to_string(),
            notes: input.notes.clone(),
            quantity: input.quantity,
            unit_price: input.unit_price,
            product_id: input.product_id,
            created_at: ts,
            updated_at: ts,
        };
        state.stock_in.insert(model.id, model.clone());
        Ok(model)
    }

    async fn reverse_stock_in(&self, record: &stock_in::Model) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        if !state.stock_in.contains_key(&record.id) {
            return Err(ServiceError::not_found("stock_in"));
        }
        state.shift(record.product_id, -record.quantity)?;
        state.stock_in.remove(&record.id);
        Ok(())
    }

    async fn apply_stock_out(&self, input: &NewStockOut) -> Result<stock_out::Model, ServiceError> {
        let mut state = self.state.lock().unwrap();
        let reference = input.reference.trim();
        if state.stock_out.values().any(|r| r.reference == reference) {
            return Err(ServiceError::conflict("stock_out", "reference", reference));
        }
        state.shift(input.product_id, -input.quantity)?;
        let ts = now();
        let model = stock_out::Model {
            id: Uuid::new_v4(),
            reference: reference.to_string(),
            date: input.recorded_at(),
            department: input.department.trim().to_string(),
            requester: input.requester.trim().to_string(),
            notes: input.notes.clone(),
            quantity: input.quantity,
            unit_price: input.unit_price,
            product_id: input.product_id,
            created_at: ts,
            updated_at: ts,
        };
        state.stock_out.insert(model.id, model.clone());
        Ok(model)
    }

    async fn reverse_stock_out(&self, record: &stock_out::Model) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        if !state.stock_out.contains_key(&record.id) {
            return Err(ServiceError::not_found("stock_out"));
        }
        state.shift(record.product_id, record.quantity)?;
        state.stock_out.remove(&record.id);
        Ok(())
    }
}
