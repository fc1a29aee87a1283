//! Create the Postgres enum type `role` (ADMIN | STAFF) used by `user.role`.
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::sea_query::extension::postgres::Type;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Role::Enum)
                    .values([Role::Admin, Role::Staff])
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_type(Type::drop().name(Role::Enum).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Role {
    #[sea_orm(iden = "role")]
    Enum,
    #[sea_orm(iden = "ADMIN")]
    Admin,
    #[sea_orm(iden = "STAFF")]
    Staff,
}
