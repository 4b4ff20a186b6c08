//! Create meter_samples table

use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_transactions::Transactions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MeterSamples::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MeterSamples::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MeterSamples::TransactionId).integer().not_null())
                    .col(
                        ColumnDef::new(MeterSamples::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MeterSamples::Measurand).string().not_null())
                    .col(ColumnDef::new(MeterSamples::Phase).string())
                    .col(ColumnDef::new(MeterSamples::Unit).string())
                    .col(ColumnDef::new(MeterSamples::Value).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meter_samples_transaction")
                            .from(MeterSamples::Table, MeterSamples::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_meter_samples_transaction")
                    .table(MeterSamples::Table)
                    .col(MeterSamples::TransactionId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MeterSamples::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum MeterSamples {
    Table,
    Id,
    TransactionId,
    Timestamp,
    Measurand,
    Phase,
    Unit,
    Value,
}
