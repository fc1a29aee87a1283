//! Create `stock_in` table: inbound ledger entries, one product each.
use sea_orm_migration::{prelude::*, schema::*};

use super::m20240501_000003_create_product::Product;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StockIn::Table)
                    .if_not_exists()
                    .col(uuid(StockIn::Id).primary_key())
                    .col(string_len(StockIn::Reference, 128).unique_key().not_null())
                    .col(timestamp_with_time_zone(StockIn::Date).not_null())
                    .col(string_len(StockIn::Supplier, 255).not_null())
                    .col(ColumnDef::new(StockIn::Notes).text().null())
                    .col(
                        integer(StockIn::Quantity)
                            .not_null()
                            .check(Expr::col(StockIn::Quantity).gt(0)),
                    )
                    .col(decimal_len(StockIn::UnitPrice, 12, 2).not_null())
                    .col(uuid(StockIn::ProductId).not_null())
                    .col(timestamp_with_time_zone(StockIn::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(StockIn::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_in_product")
                            .from(StockIn::Table, StockIn::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(StockIn::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum StockIn {
    Table,
    Id,
    Reference,
    Date,
    Supplier,
    Notes,
    Quantity,
    UnitPrice,
    ProductId,
    CreatedAt,
    UpdatedAt,
}
