//! Create connectors table

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_stations::Stations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Connectors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Connectors::StationId).string().not_null())
                    .col(ColumnDef::new(Connectors::ConnectorId).integer().not_null())
                    .col(
                        ColumnDef::new(Connectors::Status)
                            .string()
                            .not_null()
                            .default("Available"),
                    )
                    .col(ColumnDef::new(Connectors::LastErrorCode).string())
                    .col(ColumnDef::new(Connectors::LastStatusAt).timestamp_with_time_zone())
                    .primary_key(
                        Index::create()
                            .col(Connectors::StationId)
                            .col(Connectors::ConnectorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_connectors_station")
                            .from(Connectors::Table, Connectors::StationId)
                            .to(Stations::Table, Stations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Connectors::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Connectors {
    Table,
    StationId,
    ConnectorId,
    Status,
    LastErrorCode,
    LastStatusAt,
}
