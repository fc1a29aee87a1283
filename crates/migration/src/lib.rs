//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240501_000001_create_role_type;
mod m20240501_000002_create_user;
mod m20240501_000003_create_product;
mod m20240501_000004_create_stock_in;
mod m20240501_000005_create_stock_out;
mod m20240501_000006_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240501_000001_create_role_type::Migration),
            Box::new(m20240501_000002_create_user::Migration),
            Box::new(m20240501_000003_create_product::Migration),
            Box::new(m20240501_000004_create_stock_in::Migration),
            Box::new(m20240501_000005_create_stock_out::Migration),
            // Indexes should always be applied last
            Box::new(m20240501_000006_add_indexes::Migration),
        ]
    }
}
