//! Create `product` table.
//!
//! `quantity` is the cached on-hand count maintained by the stock ledger; the
//! CHECK constraint keeps it non-negative even if a writer bypasses the service.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(uuid(Product::Id).primary_key())
                    .col(string_len(Product::ProductId, 64).unique_key().not_null())
                    .col(string_len(Product::Name, 255).not_null())
                    .col(string_len(Product::Category, 128).not_null())
                    .col(string_len(Product::Unit, 32).not_null())
                    .col(ColumnDef::new(Product::Description).text().null())
                    .col(decimal_len(Product::Price, 12, 2).not_null())
                    .col(integer(Product::MinStock).not_null().default(0))
                    .col(
                        integer(Product::Quantity)
                            .not_null()
                            .default(0)
                            .check(Expr::col(Product::Quantity).gte(0)),
                    )
                    .col(timestamp_with_time_zone(Product::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Product::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Product {
    Table,
    Id,
    ProductId,
    Name,
    Category,
    Unit,
    Description,
    Price,
    MinStock,
    Quantity,
    CreatedAt,
    UpdatedAt,
}
