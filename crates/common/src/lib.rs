//! Shared building blocks for the inventory workspace: logging bootstrap,
//! response types and process-wide metrics.

pub mod types;
pub mod utils;
pub mod metrics;
