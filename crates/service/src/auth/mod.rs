//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and refresh-token rotation live here; the HTTP layer
//! only moves tokens between cookies, headers and this service.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod tokens;
pub mod repo;

pub use service::AuthService;
pub use tokens::TokenIssuer;
