//! Create `user` table.
//!
//! `refresh_token` holds the argon2 hash of the live refresh token; NULL means
//! the user has no active session.
use sea_orm_migration::{prelude::*, schema::*};

use super::m20240501_000001_create_role_type::Role;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Email, 255).unique_key().not_null())
                    .col(string_len(User::Password, 255).not_null())
                    .col(string_len(User::Name, 128).not_null())
                    .col(
                        ColumnDef::new(User::Role)
                            .custom(Role::Enum)
                            .not_null()
                            .default("STAFF"),
                    )
                    .col(
                        ColumnDef::new(User::RefreshToken)
                            .string_len(255)
                            .null(),
                    )
                    .col(timestamp_with_time_zone(User::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(User::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User { Table, Id, Email, Password, Name, Role, RefreshToken, CreatedAt, UpdatedAt }
