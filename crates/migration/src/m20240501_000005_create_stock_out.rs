//! Create `stock_out` table: outbound ledger entries, one product each.
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
                    .table(StockOut::Table)
                    .if_not_exists()
                    .col(uuid(StockOut::Id).primary_key())
                    .col(string_len(StockOut::Reference, 128).unique_key().not_null())
                    .col(timestamp_with_time_zone(StockOut::Date).not_null())
                    .col(string_len(StockOut::Department, 128).not_null())
                    .col(string_len(StockOut::Requester, 128).not_null())
                    .col(ColumnDef::new(StockOut::Notes).text().null())
                    .col(
                        integer(StockOut::Quantity)
                            .not_null()
                            .check(Expr::col(StockOut::Quantity).gt(0)),
                    )
                    .col(decimal_len(StockOut::UnitPrice, 12, 2).not_null())
                    .col(uuid(StockOut::ProductId).not_null())
                    .col(timestamp_with_time_zone(StockOut::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(StockOut::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_out_product")
                            .from(StockOut::Table, StockOut::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(StockOut::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum StockOut {
    Table,
    Id,
    Reference,
    Date,
    Department,
    Requester,
    Notes,
    Quantity,
    UnitPrice,
    ProductId,
    CreatedAt,
    UpdatedAt,
}
