//! Service layer: inventory and auth business rules on top of `models`.
//! - Each persistence seam is an `async_trait` repository with a SeaORM
//!   implementation and an in-memory mock (`mock`, `auth::repository::mock`).
//! - Stock mutations go through `stock::QuantityReconciler` so a ledger row
//!   and its product quantity change commit together.
//! - Errors are `thiserror` enums with stable codes; the HTTP layer maps them.

pub mod errors;
pub mod product;
pub mod stock;
pub mod auth;
pub mod mock;
#[cfg(test)]
pub mod test_support;
