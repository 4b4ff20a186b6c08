//! Transaction and MeterSample domain entities (spec §3).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::DomainResult;

/// One charging session, immutable once stopped.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i32,
    pub station_id: String,
    pub connector_id: u32,
    pub id_tag: String,
    pub meter_start: i32,
    pub meter_stop: Option<i32>,
    pub start_time: DateTime<Utc>,
    pub stop_time: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub reservation_id: Option<i32>,
}

impl Transaction {
    pub fn new(
        id: i32,
        station_id: impl Into<String>,
        connector_id: u32,
        id_tag: impl Into<String>,
        meter_start: i32,
        start_time: DateTime<Utc>,
        reservation_id: Option<i32>,
    ) -> Self {
        Self {
            id,
            station_id: station_id.into(),
            connector_id,
            id_tag: id_tag.into(),
            meter_start,
            meter_stop: None,
            start_time,
            stop_time: None,
            reason: None,
            reservation_id,
        }
    }

    pub fn is_open(&self) -> bool {
        self.meter_stop.is_none()
    }

    /// Stop the transaction, clamping a negative delta to zero per spec
    /// §4.D ("must be ≥ 0; negative → clamp to 0 and log").
    ///
    /// Returns the total energy delivered (Wh) and whether clamping occurred.
    pub fn stop(
        &mut self,
        meter_stop: i32,
        stop_time: DateTime<Utc>,
        reason: Option<String>,
    ) -> (i32, bool) {
        let stop_time = if stop_time < self.start_time {
            self.start_time
        } else {
            stop_time
        };
        let raw = meter_stop - self.meter_start;
        let (effective_stop, clamped) = if raw < 0 {
            (self.meter_start, true)
        } else {
            (meter_stop, false)
        };
        self.meter_stop = Some(effective_stop);
        self.stop_time = Some(stop_time);
        self.reason = reason;
        (effective_stop - self.meter_start, clamped)
    }

    pub fn total_energy(&self) -> Option<i32> {
        self.meter_stop.map(|stop| stop - self.meter_start)
    }
}

/// Append-only meter reading sample tied to a transaction (spec §3).
#[derive(Debug, Clone)]
pub struct MeterSample {
    pub transaction_id: i32,
    pub timestamp: DateTime<Utc>,
    pub measurand: String,
    pub phase: Option<String>,
    pub unit: Option<String>,
    pub value: String,
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Allocate the next transaction id and persist the opening row in one
    /// step — the allocator must be atomic across concurrent callers (spec
    /// §4.F); the returned id is the autoincrement primary key, never an
    /// in-memory counter, so it survives a restart (spec invariant 4).
    async fn allocate_transaction(
        &self,
        station_id: &str,
        connector_id: u32,
        id_tag: &str,
        meter_start: i32,
        start_time: DateTime<Utc>,
        reservation_id: Option<i32>,
    ) -> DomainResult<Transaction>;

    /// Idempotency lookup for StartTransaction retries within the window
    /// (spec §4.D, §9 open question: 60s is a design choice).
    async fn find_recent_start(
        &self,
        station_id: &str,
        connector_id: u32,
        id_tag: &str,
        timestamp: DateTime<Utc>,
        window_secs: i64,
    ) -> DomainResult<Option<Transaction>>;

    async fn find_open_by_id(&self, id: i32) -> DomainResult<Option<Transaction>>;

    async fn find_open_for_connector(
        &self,
        station_id: &str,
        connector_id: u32,
    ) -> DomainResult<Option<Transaction>>;

    async fn finalize_transaction(
        &self,
        id: i32,
        meter_stop: i32,
        stop_time: DateTime<Utc>,
        reason: Option<String>,
    ) -> DomainResult<Option<Transaction>>;

    /// Batched append, per spec §4.D/§5 ("buffer and drop oldest if >N in
    /// flight"); the repository itself only needs to persist whatever
    /// batch survives the session-side backpressure policy.
    async fn append_meter_samples(&self, samples: Vec<MeterSample>) -> DomainResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_tx() -> Transaction {
        Transaction::new(1, "CP1", 1, "TAG1", 1000, Utc::now(), None)
    }

    #[test]
    fn new_transaction_is_open() {
        let tx = sample_tx();
        assert!(tx.is_open());
        assert_eq!(tx.total_energy(), None);
    }

    #[test]
    fn stop_computes_total_energy() {
        let mut tx = sample_tx();
        let (energy, clamped) = tx.stop(5000, tx.start_time + Duration::minutes(25), None);
        assert_eq!(energy, 4000);
        assert!(!clamped);
        assert_eq!(tx.meter_stop, Some(5000));
        assert!(!tx.is_open());
    }

    #[test]
    fn stop_clamps_negative_energy_to_zero() {
        let mut tx = sample_tx();
        let (energy, clamped) = tx.stop(500, tx.start_time + Duration::minutes(1), None);
        assert_eq!(energy, 0);
        assert!(clamped);
        assert_eq!(tx.meter_stop, Some(1000));
    }

    #[test]
    fn stop_time_never_precedes_start_time() {
        let mut tx = sample_tx();
        let before_start = tx.start_time - Duration::seconds(5);
        tx.stop(1500, before_start, None);
        assert_eq!(tx.stop_time, Some(tx.start_time));
    }
}
