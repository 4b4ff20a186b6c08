//! In-memory repository implementations for tests and local development.

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::{
    AuthorizationRecord, AuthorizationRepository, Connector, ConnectorStatus, DomainError,
    DomainResult, MeterSample, RegistrationStatus, Reservation, ReservationRepository, Station,
    StationRepository, Transaction, TransactionRepository,
};

/// In-memory station + connector store.
#[derive(Default)]
pub struct InMemoryStationRepository {
    stations: DashMap<String, Station>,
    connectors: DashMap<(String, u32), Connector>,
    firmware_status_log: DashMap<String, Vec<(String, DateTime<Utc>)>>,
    diagnostics_status_log: DashMap<String, Vec<(String, DateTime<Utc>)>>,
}

impl InMemoryStationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StationRepository for InMemoryStationRepository {
    async fn upsert_station(
        &self,
        id: &str,
        vendor: &str,
        model: &str,
        firmware_version: Option<&str>,
    ) -> DomainResult<Station> {
        let mut station = self.stations.entry(id.to_string()).or_insert_with(|| Station::new(id));
        station.vendor = Some(vendor.to_string());
        station.model = Some(model.to_string());
        station.firmware_version = firmware_version.map(str::to_string);
        Ok(station.clone())
    }

    async fn insert_boot(&self, id: &str, status: RegistrationStatus) -> DomainResult<()> {
        let mut station = self
            .stations
            .get_mut(id)
            .ok_or_else(|| DomainError::StationNotFound(id.to_string()))?;
        station.registration_status = status;
        station.last_boot_at = Some(Utc::now());
        Ok(())
    }

    async fn update_heartbeat(&self, id: &str) -> DomainResult<DateTime<Utc>> {
        let mut station = self
            .stations
            .get_mut(id)
            .ok_or_else(|| DomainError::StationNotFound(id.to_string()))?;
        let now = Utc::now();
        station.last_heartbeat_at = Some(now);
        Ok(now)
    }

    async fn get_station(&self, id: &str) -> DomainResult<Option<Station>> {
        Ok(self.stations.get(id).map(|s| s.clone()))
    }

    async fn list_stations(&self) -> DomainResult<Vec<Station>> {
        Ok(self.stations.iter().map(|e| e.value().clone()).collect())
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
        let mut entry = self
            .connectors
            .entry((station_id.to_string(), connector_id))
            .or_insert_with(|| Connector::new(connector_id));
        Ok(entry.apply_status(status, error_code.map(str::to_string), timestamp))
    }

    async fn get_connector(
        &self,
        station_id: &str,
        connector_id: u32,
    ) -> DomainResult<Option<Connector>> {
        Ok(self
            .connectors
            .get(&(station_id.to_string(), connector_id))
            .map(|c| c.clone()))
    }

    async fn record_firmware_status(
        &self,
        station_id: &str,
        status: &str,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.firmware_status_log
            .entry(station_id.to_string())
            .or_default()
            .push((status.to_string(), timestamp));
        Ok(())
    }

    async fn record_diagnostics_status(
        &self,
        station_id: &str,
        status: &str,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.diagnostics_status_log
            .entry(station_id.to_string())
            .or_default()
            .push((status.to_string(), timestamp));
        Ok(())
    }
}

/// In-memory transaction + meter sample store.
pub struct InMemoryTransactionRepository {
    transactions: DashMap<i32, Transaction>,
    meter_samples: DashMap<i32, Vec<MeterSample>>,
    next_id: AtomicI32,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
            meter_samples: DashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryTransactionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn allocate_transaction(
        &self,
        station_id: &str,
        connector_id: u32,
        id_tag: &str,
        meter_start: i32,
        start_time: DateTime<Utc>,
        reservation_id: Option<i32>,
    ) -> DomainResult<Transaction> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let tx = Transaction::new(id, station_id, connector_id, id_tag, meter_start, start_time, reservation_id);
        self.transactions.insert(id, tx.clone());
        Ok(tx)
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
        Ok(self
            .transactions
            .iter()
            .filter(|e| {
                e.station_id == station_id
                    && e.connector_id == connector_id
                    && e.id_tag == id_tag
                    && e.start_time >= since
            })
            .max_by_key(|e| e.id)
            .map(|e| e.value().clone()))
    }

    async fn find_open_by_id(&self, id: i32) -> DomainResult<Option<Transaction>> {
        Ok(self.transactions.get(&id).filter(|t| t.is_open()).map(|t| t.clone()))
    }

    async fn find_open_for_connector(
        &self,
        station_id: &str,
        connector_id: u32,
    ) -> DomainResult<Option<Transaction>> {
        Ok(self
            .transactions
            .iter()
            .filter(|e| e.station_id == station_id && e.connector_id == connector_id && e.is_open())
            .max_by_key(|e| e.id)
            .map(|e| e.value().clone()))
    }

    async fn finalize_transaction(
        &self,
        id: i32,
        meter_stop: i32,
        stop_time: DateTime<Utc>,
        reason: Option<String>,
    ) -> DomainResult<Option<Transaction>> {
        let Some(mut tx) = self.transactions.get_mut(&id) else {
            return Ok(None);
        };
        if tx.is_open() {
            tx.stop(meter_stop, stop_time, reason);
        }
        Ok(Some(tx.clone()))
    }

    async fn append_meter_samples(&self, samples: Vec<MeterSample>) -> DomainResult<()> {
        for sample in samples {
            self.meter_samples.entry(sample.transaction_id).or_default().push(sample);
        }
        Ok(())
    }
}

/// In-memory authorization (id tag) store.
#[derive(Default)]
pub struct InMemoryAuthorizationRepository {
    records: DashMap<String, AuthorizationRecord>,
}

impl InMemoryAuthorizationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: AuthorizationRecord) {
        self.records.insert(record.id_tag.clone(), record);
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAuthorizationRepository {
    async fn find(&self, id_tag: &str) -> DomainResult<Option<AuthorizationRecord>> {
        Ok(self.records.get(id_tag).map(|r| r.clone()))
    }
}

/// In-memory reservation store.
pub struct InMemoryReservationRepository {
    reservations: DashMap<i32, Reservation>,
    next_id: AtomicI32,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self {
            reservations: DashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryReservationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn create(&self, mut reservation: Reservation) -> DomainResult<Reservation> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        reservation.id = id;
        self.reservations.insert(id, reservation.clone());
        Ok(reservation)
    }

    async fn find_active_for_connector(
        &self,
        station_id: &str,
        connector_id: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<Reservation>> {
        Ok(self
            .reservations
            .iter()
            .filter(|e| e.station_id == station_id && e.connector_id == connector_id && e.is_active(now))
            .max_by_key(|e| e.id)
            .map(|e| e.value().clone()))
    }

    async fn cancel(&self, id: i32) -> DomainResult<bool> {
        let Some(mut reservation) = self.reservations.get_mut(&id) else {
            return Ok(false);
        };
        reservation.cancelled = true;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn station_upsert_then_boot_then_heartbeat() {
        let repo = InMemoryStationRepository::new();
        repo.upsert_station("CP1", "Acme", "X1", None).await.unwrap();
        repo.insert_boot("CP1", RegistrationStatus::Accepted).await.unwrap();
        repo.update_heartbeat("CP1").await.unwrap();
        let station = repo.get_station("CP1").await.unwrap().unwrap();
        assert_eq!(station.registration_status, RegistrationStatus::Accepted);
        assert!(station.last_heartbeat_at.is_some());
    }

    #[tokio::test]
    async fn transaction_allocate_and_finalize() {
        let repo = InMemoryTransactionRepository::new();
        let tx = repo
            .allocate_transaction("CP1", 1, "TAG1", 1000, Utc::now(), None)
            .await
            .unwrap();
        assert!(tx.is_open());
        let finalized = repo
            .finalize_transaction(tx.id, 1500, Utc::now(), None)
            .await
            .unwrap()
            .unwrap();
        assert!(!finalized.is_open());
        assert_eq!(finalized.total_energy(), Some(500));
    }

    #[tokio::test]
    async fn reservation_create_then_cancel() {
        let repo = InMemoryReservationRepository::new();
        let r = Reservation::new(0, "CP1", 1, "TAG1", Utc::now() + chrono::Duration::minutes(30), None);
        let created = repo.create(r).await.unwrap();
        assert!(repo.cancel(created.id).await.unwrap());
        assert!(!repo.cancel(999).await.unwrap());
    }
}
