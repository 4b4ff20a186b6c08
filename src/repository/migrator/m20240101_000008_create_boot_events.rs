//! Create boot_events table

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
                    .table(BootEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BootEvents::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BootEvents::StationId).string().not_null())
                    .col(ColumnDef::new(BootEvents::Vendor).string().not_null())
                    .col(ColumnDef::new(BootEvents::Model).string().not_null())
                    .col(ColumnDef::new(BootEvents::FirmwareVersion).string())
                    .col(ColumnDef::new(BootEvents::RegistrationStatus).string().not_null())
                    .col(
                        ColumnDef::new(BootEvents::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_boot_events_station")
                            .from(BootEvents::Table, BootEvents::StationId)
                            .to(Stations::Table, Stations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_boot_events_station")
                    .table(BootEvents::Table)
                    .col(BootEvents::StationId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BootEvents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum BootEvents {
    Table,
    Id,
    StationId,
    Vendor,
    Model,
    FirmwareVersion,
    RegistrationStatus,
    Timestamp,
}
