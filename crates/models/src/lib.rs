//! SeaORM entities for the inventory schema plus the field rules every writer
//! applies before touching the database.

pub mod errors;
pub mod db;
pub mod validation;
pub mod user;
pub mod product;
pub mod stock_in;
pub mod stock_out;

#[cfg(test)]
mod tests;
