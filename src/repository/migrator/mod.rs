//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_stations;
mod m20240101_000002_create_connectors;
mod m20240101_000003_create_transactions;
mod m20240101_000004_create_meter_samples;
mod m20240101_000005_create_authorizations;
mod m20240101_000006_create_reservations;
mod m20240101_000007_create_status_history;
mod m20240101_000008_create_boot_events;
mod m20240101_000009_create_heartbeats;
mod m20240101_000010_create_firmware_status;
mod m20240101_000011_create_diagnostics_status;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_stations::Migration),
            Box::new(m20240101_000002_create_connectors::Migration),
            Box::new(m20240101_000003_create_transactions::Migration),
            Box::new(m20240101_000004_create_meter_samples::Migration),
            Box::new(m20240101_000005_create_authorizations::Migration),
            Box::new(m20240101_000006_create_reservations::Migration),
            Box::new(m20240101_000007_create_status_history::Migration),
            Box::new(m20240101_000008_create_boot_events::Migration),
            Box::new(m20240101_000009_create_heartbeats::Migration),
            Box::new(m20240101_000010_create_firmware_status::Migration),
            Box::new(m20240101_000011_create_diagnostics_status::Migration),
        ]
    }
}
