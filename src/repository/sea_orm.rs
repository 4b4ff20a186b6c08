//! SeaORM-backed implementations of the domain repository traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

use crate::domain::{
    AuthorizationRecord, AuthorizationRepository, AuthorizationStatus, Connector,
    ConnectorStatus, DomainError, DomainResult, MeterSample, RegistrationStatus, RepositoryError,
    Reservation, ReservationRepository, Station, StationRepository, Transaction,
    TransactionRepository,
};

use super::entities::{
    authorization, boot_event, connector, diagnostics_status, firmware_status, heartbeat,
    meter_sample, reservation, station, status_history, transaction,
};

/// Maps a SeaORM error onto the domain taxonomy. Connection-level failures
/// are transient and worth retrying; everything else is treated as a
/// permanent failure of the specific operation.
fn db_err(e: sea_orm::DbErr) -> DomainError {
    let repo_err = match &e {
        sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Exec(_) => {
            RepositoryError::Transient(e.to_string())
        }
        _ => RepositoryError::Permanent(e.to_string()),
    };
    DomainError::Repository(repo_err)
}

fn station_from_model(m: station::Model) -> Station {
    Station {
        id: m.id,
        vendor: m.vendor,
        model: m.model,
        firmware_version: m.firmware_version,
        registration_status: RegistrationStatus::from_str(&m.registration_status),
        last_boot_at: m.last_boot_at,
        last_heartbeat_at: m.last_heartbeat_at,
    }
}

fn connector_from_model(m: connector::Model) -> Option<Connector> {
    Some(Connector {
        connector_id: m.connector_id as u32,
        status: ConnectorStatus::from_str(&m.status)?,
        last_error_code: m.last_error_code,
        last_status_at: m.last_status_at,
    })
}

fn transaction_from_model(m: transaction::Model) -> Transaction {
    Transaction {
        id: m.id,
        station_id: m.station_id,
        connector_id: m.connector_id as u32,
        id_tag: m.id_tag,
        meter_start: m.meter_start,
        meter_stop: m.meter_stop,
        start_time: m.start_time,
        stop_time: m.stop_time,
        reason: m.reason,
        reservation_id: m.reservation_id,
    }
}

fn reservation_from_model(m: reservation::Model) -> Reservation {
    Reservation {
        id: m.id,
        station_id: m.station_id,
        connector_id: m.connector_id as u32,
        id_tag: m.id_tag,
        expiry_date: m.expiry_date,
        parent_id_tag: m.parent_id_tag,
        cancelled: m.cancelled,
    }
}

// ── Station ──────────────────────────────────────────────────────

pub struct SeaOrmStationRepository {
    db: DatabaseConnection,
}

impl SeaOrmStationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StationRepository for SeaOrmStationRepository {
    async fn upsert_station(
        &self,
        id: &str,
        vendor: &str,
        model: &str,
        firmware_version: Option<&str>,
    ) -> DomainResult<Station> {
        debug!(station = id, "upserting station");
        let existing = station::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)?;

        let active = station::ActiveModel {
            id: Set(id.to_string()),
            vendor: Set(Some(vendor.to_string())),
            model: Set(Some(model.to_string())),
            firmware_version: Set(firmware_version.map(str::to_string)),
            registration_status: existing
                .as_ref()
                .map(|e| Set(e.registration_status.clone()))
                .unwrap_or_else(|| Set(RegistrationStatus::Pending.as_str().to_string())),
            last_boot_at: existing.as_ref().map(|e| Set(e.last_boot_at)).unwrap_or(NotSet),
            last_heartbeat_at: existing
                .as_ref()
                .map(|e| Set(e.last_heartbeat_at))
                .unwrap_or(NotSet),
        };

        let model = if existing.is_some() {
            active.update(&self.db).await.map_err(db_err)?
        } else {
            active.insert(&self.db).await.map_err(db_err)?
        };
        Ok(station_from_model(model))
    }

    async fn insert_boot(&self, id: &str, status: RegistrationStatus) -> DomainResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let existing = station::Entity::find_by_id(id).one(&txn).await.map_err(db_err)?;
        let Some(existing) = existing else {
            return Err(DomainError::StationNotFound(id.to_string()));
        };
        let now = Utc::now();
        let boot_event_row = boot_event::ActiveModel {
            id: NotSet,
            station_id: Set(id.to_string()),
            vendor: Set(existing.vendor.clone().unwrap_or_default()),
            model: Set(existing.model.clone().unwrap_or_default()),
            firmware_version: Set(existing.firmware_version.clone()),
            registration_status: Set(status.as_str().to_string()),
            timestamp: Set(now),
        };
        boot_event_row.insert(&txn).await.map_err(db_err)?;

        let mut active: station::ActiveModel = existing.into();
        active.registration_status = Set(status.as_str().to_string());
        active.last_boot_at = Set(Some(now));
        active.update(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn update_heartbeat(&self, id: &str) -> DomainResult<DateTime<Utc>> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let existing = station::Entity::find_by_id(id).one(&txn).await.map_err(db_err)?;
        let Some(existing) = existing else {
            return Err(DomainError::StationNotFound(id.to_string()));
        };
        let now = Utc::now();

        let heartbeat_row = heartbeat::ActiveModel {
            id: NotSet,
            station_id: Set(id.to_string()),
            timestamp: Set(now),
        };
        heartbeat_row.insert(&txn).await.map_err(db_err)?;

        let mut active: station::ActiveModel = existing.into();
        active.last_heartbeat_at = Set(Some(now));
        active.update(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(now)
    }

    async fn get_station(&self, id: &str) -> DomainResult<Option<Station>> {
        let model = station::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)?;
        Ok(model.map(station_from_model))
    }

    async fn list_stations(&self) -> DomainResult<Vec<Station>> {
        let models = station::Entity::find().all(&self.db).await.map_err(db_err)?;
        Ok(models.into_iter().map(station_from_model).collect())
    }

    async fn is_denylisted(&self, _id: &str) -> DomainResult<bool> {
        Ok(false)
    }

    async fn upsert_connector_status(
        &self,
        station_id: &str,
        connector_id: u32,
        status: ConnectorStatus,
        error_code: Option<&str>,
        timestamp: Option<DateTime<Utc>>,
    ) -> DomainResult<bool> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let existing = connector::Entity::find_by_id((station_id.to_string(), connector_id as i32))
            .one(&txn)
            .await
            .map_err(db_err)?;

        let mut conn = match &existing {
            Some(m) => connector_from_model(m.clone()).ok_or_else(|| {
                DomainError::Validation(format!("unrecognized connector status: {}", m.status))
            })?,
            None => Connector::new(connector_id),
        };
        let changed = conn.apply_status(status, error_code.map(str::to_string), timestamp);

        let history_row = status_history::ActiveModel {
            id: NotSet,
            station_id: Set(station_id.to_string()),
            connector_id: Set(connector_id as i32),
            status: Set(conn.status.as_str().to_string()),
            error_code: Set(conn.last_error_code.clone()),
            timestamp: Set(timestamp.unwrap_or_else(Utc::now)),
        };
        history_row.insert(&txn).await.map_err(db_err)?;

        let active = connector::ActiveModel {
            station_id: Set(station_id.to_string()),
            connector_id: Set(connector_id as i32),
            status: Set(conn.status.as_str().to_string()),
            last_error_code: Set(conn.last_error_code.clone()),
            last_status_at: Set(conn.last_status_at),
        };
        if existing.is_some() {
            active.update(&txn).await.map_err(db_err)?;
        } else {
            active.insert(&txn).await.map_err(db_err)?;
        }
        txn.commit().await.map_err(db_err)?;
        Ok(changed)
    }

    async fn get_connector(
        &self,
        station_id: &str,
        connector_id: u32,
    ) -> DomainResult<Option<Connector>> {
        let model = connector::Entity::find_by_id((station_id.to_string(), connector_id as i32))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.and_then(connector_from_model))
    }

    async fn record_firmware_status(
        &self,
        station_id: &str,
        status: &str,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<()> {
        let active = firmware_status::ActiveModel {
            id: NotSet,
            station_id: Set(station_id.to_string()),
            status: Set(status.to_string()),
            timestamp: Set(timestamp),
        };
        active.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn record_diagnostics_status(
        &self,
        station_id: &str,
        status: &str,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<()> {
        let active = diagnostics_status::ActiveModel {
            id: NotSet,
            station_id: Set(station_id.to_string()),
            status: Set(status.to_string()),
            timestamp: Set(timestamp),
        };
        active.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}

// ── Transaction ──────────────────────────────────────────────────

pub struct SeaOrmTransactionRepository {
    db: DatabaseConnection,
}

impl SeaOrmTransactionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionRepository for SeaOrmTransactionRepository {
    async fn allocate_transaction(
        &self,
        station_id: &str,
        connector_id: u32,
        id_tag: &str,
        meter_start: i32,
        start_time: DateTime<Utc>,
        reservation_id: Option<i32>,
    ) -> DomainResult<Transaction> {
        let active = transaction::ActiveModel {
            id: NotSet,
            station_id: Set(station_id.to_string()),
            connector_id: Set(connector_id as i32),
            id_tag: Set(id_tag.to_string()),
            meter_start: Set(meter_start),
            meter_stop: Set(None),
            start_time: Set(start_time),
            stop_time: Set(None),
            reason: Set(None),
            reservation_id: Set(reservation_id),
        };
        let model = active.insert(&self.db).await.map_err(db_err)?;
        Ok(transaction_from_model(model))
    }

    async fn find_recent_start(
        &self,
        station_id: &str,
        connector_id: u32,
        id_tag: &str,
        timestamp: DateTime<Utc>,
        window_secs: i64,
    ) -> DomainResult<Option<Transaction>> {
        let since = timestamp - chrono::Duration::seconds(window_secs);
        let model = transaction::Entity::find()
            .filter(transaction::Column::StationId.eq(station_id))
            .filter(transaction::Column::ConnectorId.eq(connector_id as i32))
            .filter(transaction::Column::IdTag.eq(id_tag))
            .filter(transaction::Column::StartTime.gte(since))
            .order_by_desc(transaction::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(transaction_from_model))
    }

    async fn find_open_by_id(&self, id: i32) -> DomainResult<Option<Transaction>> {
        let model = transaction::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)?;
        Ok(model.map(transaction_from_model).filter(Transaction::is_open))
    }

    async fn find_open_for_connector(
        &self,
        station_id: &str,
        connector_id: u32,
    ) -> DomainResult<Option<Transaction>> {
        let model = transaction::Entity::find()
            .filter(transaction::Column::StationId.eq(station_id))
            .filter(transaction::Column::ConnectorId.eq(connector_id as i32))
            .filter(transaction::Column::StopTime.is_null())
            .order_by_desc(transaction::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(transaction_from_model))
    }

    async fn finalize_transaction(
        &self,
        id: i32,
        meter_stop: i32,
        stop_time: DateTime<Utc>,
        reason: Option<String>,
    ) -> DomainResult<Option<Transaction>> {
        let existing = transaction::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)?;
        let Some(existing) = existing else {
            return Ok(None);
        };
        let mut tx = transaction_from_model(existing);
        if !tx.is_open() {
            return Ok(Some(tx));
        }
        tx.stop(meter_stop, stop_time, reason);

        let active = transaction::ActiveModel {
            id: Set(tx.id),
            station_id: Set(tx.station_id.clone()),
            connector_id: Set(tx.connector_id as i32),
            id_tag: Set(tx.id_tag.clone()),
            meter_start: Set(tx.meter_start),
            meter_stop: Set(tx.meter_stop),
            start_time: Set(tx.start_time),
            stop_time: Set(tx.stop_time),
            reason: Set(tx.reason.clone()),
            reservation_id: Set(tx.reservation_id),
        };
        active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(tx))
    }

    async fn append_meter_samples(&self, samples: Vec<MeterSample>) -> DomainResult<()> {
        if samples.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin().await.map_err(db_err)?;
        for sample in samples {
            let active = meter_sample::ActiveModel {
                id: NotSet,
                transaction_id: Set(sample.transaction_id),
                timestamp: Set(sample.timestamp),
                measurand: Set(sample.measurand),
                phase: Set(sample.phase),
                unit: Set(sample.unit),
                value: Set(sample.value),
            };
            active.insert(&txn).await.map_err(db_err)?;
        }
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }
}

// ── Authorization ────────────────────────────────────────────────

pub struct SeaOrmAuthorizationRepository {
    db: DatabaseConnection,
}

impl SeaOrmAuthorizationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthorizationRepository for SeaOrmAuthorizationRepository {
    async fn find(&self, id_tag: &str) -> DomainResult<Option<AuthorizationRecord>> {
        let model = authorization::Entity::find_by_id(id_tag.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(|m| AuthorizationRecord {
            id_tag: m.id_tag,
            status: AuthorizationStatus::from_str(&m.status),
            expiry_date: m.expiry_date,
            parent_id_tag: m.parent_id_tag,
        }))
    }
}

// ── Reservation ──────────────────────────────────────────────────

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn create(&self, reservation: Reservation) -> DomainResult<Reservation> {
        let active = reservation::ActiveModel {
            id: NotSet,
            station_id: Set(reservation.station_id),
            connector_id: Set(reservation.connector_id as i32),
            id_tag: Set(reservation.id_tag),
            expiry_date: Set(reservation.expiry_date),
            parent_id_tag: Set(reservation.parent_id_tag),
            cancelled: Set(false),
        };
        let model = active.insert(&self.db).await.map_err(db_err)?;
        Ok(reservation_from_model(model))
    }

    async fn find_active_for_connector(
        &self,
        station_id: &str,
        connector_id: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<Reservation>> {
        let model = reservation::Entity::find()
            .filter(reservation::Column::StationId.eq(station_id))
            .filter(reservation::Column::ConnectorId.eq(connector_id as i32))
            .filter(reservation::Column::Cancelled.eq(false))
            .filter(reservation::Column::ExpiryDate.gt(now))
            .order_by_desc(reservation::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(reservation_from_model))
    }

    async fn cancel(&self, id: i32) -> DomainResult<bool> {
        let existing = reservation::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)?;
        let Some(existing) = existing else {
            return Ok(false);
        };
        let mut active: reservation::ActiveModel = existing.into();
        active.cancelled = Set(true);
        active.update(&self.db).await.map_err(db_err)?;
        Ok(true)
    }
}
