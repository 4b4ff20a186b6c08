//! Create status_history table

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
                    .table(StatusHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StatusHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StatusHistory::StationId).string().not_null())
                    .col(ColumnDef::new(StatusHistory::ConnectorId).integer().not_null())
                    .col(ColumnDef::new(StatusHistory::Status).string().not_null())
                    .col(ColumnDef::new(StatusHistory::ErrorCode).string())
                    .col(
                        ColumnDef::new(StatusHistory::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_history_station")
                            .from(StatusHistory::Table, StatusHistory::StationId)
                            .to(Stations::Table, Stations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_status_history_station_connector")
                    .table(StatusHistory::Table)
                    .col(StatusHistory::StationId)
                    .col(StatusHistory::ConnectorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StatusHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum StatusHistory {
    Table,
    Id,
    StationId,
    ConnectorId,
    Status,
    ErrorCode,
    Timestamp,
}
