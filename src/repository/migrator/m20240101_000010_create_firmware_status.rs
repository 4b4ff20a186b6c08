//! Create firmware_status table

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
                    .table(FirmwareStatus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FirmwareStatus::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FirmwareStatus::StationId).string().not_null())
                    .col(ColumnDef::new(FirmwareStatus::Status).string().not_null())
                    .col(
                        ColumnDef::new(FirmwareStatus::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_firmware_status_station")
                            .from(FirmwareStatus::Table, FirmwareStatus::StationId)
                            .to(Stations::Table, Stations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_firmware_status_station")
                    .table(FirmwareStatus::Table)
                    .col(FirmwareStatus::StationId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FirmwareStatus::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum FirmwareStatus {
    Table,
    Id,
    StationId,
    Status,
    Timestamp,
}
