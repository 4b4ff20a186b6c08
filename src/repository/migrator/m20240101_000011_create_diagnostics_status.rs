//! Create diagnostics_status table

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
                    .table(DiagnosticsStatus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DiagnosticsStatus::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DiagnosticsStatus::StationId).string().not_null())
                    .col(ColumnDef::new(DiagnosticsStatus::Status).string().not_null())
                    .col(
                        ColumnDef::new(DiagnosticsStatus::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_diagnostics_status_station")
                            .from(DiagnosticsStatus::Table, DiagnosticsStatus::StationId)
                            .to(Stations::Table, Stations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_diagnostics_status_station")
                    .table(DiagnosticsStatus::Table)
                    .col(DiagnosticsStatus::StationId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiagnosticsStatus::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum DiagnosticsStatus {
    Table,
    Id,
    StationId,
    Status,
    Timestamp,
}
