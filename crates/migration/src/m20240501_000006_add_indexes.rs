use sea_orm_migration::prelude::*;

use super::m20240501_000003_create_product::Product;
use super::m20240501_000004_create_stock_in::StockIn;
use super::m20240501_000005_create_stock_out::StockOut;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Product: category listing and name ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_product_category")
                    .table(Product::Table)
                    .col(Product::Category)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_product_name")
                    .table(Product::Table)
                    .col(Product::Name)
                    .to_owned(),
            )
            .await?;

        // Ledger: per-product lookups and date-descending listings
        manager
            .create_index(
                Index::create()
                    .name("idx_stock_in_product")
                    .table(StockIn::Table)
                    .col(StockIn::ProductId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_stock_in_date")
                    .table(StockIn::Table)
                    .col(StockIn::Date)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_stock_out_product")
                    .table(StockOut::Table)
                    .col(StockOut::ProductId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_stock_out_date")
                    .table(StockOut::Table)
                    .col(StockOut::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_product_category").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_name").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_stock_in_product").table(StockIn::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_stock_in_date").table(StockIn::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_stock_out_product").table(StockOut::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_stock_out_date").table(StockOut::Table).to_owned())
            .await
    }
}
