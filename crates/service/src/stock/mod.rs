//! Stock ledger: inbound/outbound movement records and the reconciler that
//! keeps `product.quantity` equal to initial stock plus net movement.

pub mod domain;
pub mod reconciler;
pub mod repository;
pub mod service;

pub use reconciler::QuantityReconciler;
pub use service::{StockInService, StockOutService};
