//! Create transactions table

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
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::StationId).string().not_null())
                    .col(ColumnDef::new(Transactions::ConnectorId).integer().not_null())
                    .col(ColumnDef::new(Transactions::IdTag).string().not_null())
                    .col(ColumnDef::new(Transactions::MeterStart).integer().not_null())
                    .col(ColumnDef::new(Transactions::MeterStop).integer())
                    .col(
                        ColumnDef::new(Transactions::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::StopTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(Transactions::Reason).string())
                    .col(ColumnDef::new(Transactions::ReservationId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_station")
                            .from(Transactions::Table, Transactions::StationId)
                            .to(Stations::Table, Stations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_station_connector")
                    .table(Transactions::Table)
                    .col(Transactions::StationId)
                    .col(Transactions::ConnectorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Transactions {
    Table,
    Id,
    StationId,
    ConnectorId,
    IdTag,
    MeterStart,
    MeterStop,
    StartTime,
    StopTime,
    Reason,
    ReservationId,
}
