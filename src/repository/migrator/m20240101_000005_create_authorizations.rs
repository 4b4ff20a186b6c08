//! Create authorizations table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Authorizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Authorizations::IdTag)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Authorizations::Status).string().not_null())
                    .col(ColumnDef::new(Authorizations::ExpiryDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Authorizations::ParentIdTag).string())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Authorizations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Authorizations {
    Table,
    IdTag,
    Status,
    ExpiryDate,
    ParentIdTag,
}
