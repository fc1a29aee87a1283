//! Product store: CRUD over `product` plus the derived stock views.

pub mod domain;
pub mod repository;
pub mod service;

pub use service::ProductService;
