//! Station (charge point) and Connector domain entities (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use async_trait::async_trait;

use super::error::DomainResult;

/// Outcome of BootNotification registration (spec §4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Accepted,
    Pending,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Pending => "Pending",
            Self::Rejected => "Rejected",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Accepted" => Self::Accepted,
            "Rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }
}

/// Connector status (OCPP 1.6 `ChargePointStatus`, spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorStatus {
    Available,
    Preparing,
    Charging,
    SuspendedEVSE,
    SuspendedEV,
    Finishing,
    Reserved,
    Unavailable,
    Faulted,
}

impl ConnectorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Preparing => "Preparing",
            Self::Charging => "Charging",
            Self::SuspendedEVSE => "SuspendedEVSE",
            Self::SuspendedEV => "SuspendedEV",
            Self::Finishing => "Finishing",
            Self::Reserved => "Reserved",
            Self::Unavailable => "Unavailable",
            Self::Faulted => "Faulted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "Available" => Self::Available,
            "Preparing" => Self::Preparing,
            "Charging" => Self::Charging,
            "SuspendedEVSE" => Self::SuspendedEVSE,
            "SuspendedEV" => Self::SuspendedEV,
            "Finishing" => Self::Finishing,
            "Reserved" => Self::Reserved,
            "Unavailable" => Self::Unavailable,
            "Faulted" => Self::Faulted,
            _ => return None,
        })
    }
}

impl Default for ConnectorStatus {
    fn default() -> Self {
        Self::Available
    }
}

/// Sub-entity of a Station, keyed by (station_id, connector_id). Connector
/// 0 refers to the station as a whole (spec §3).
#[derive(Debug, Clone)]
pub struct Connector {
    pub connector_id: u32,
    pub status: ConnectorStatus,
    pub last_error_code: Option<String>,
    pub last_status_at: Option<DateTime<Utc>>,
}

impl Connector {
    pub fn new(connector_id: u32) -> Self {
        Self {
            connector_id,
            status: ConnectorStatus::default(),
            last_error_code: None,
            last_status_at: None,
        }
    }

    /// Apply a StatusNotification update, honoring spec invariant (iii):
    /// a timestamped update only applies if it isn't older than what we
    /// already recorded; an untimestamped update is always last-write-wins.
    pub fn apply_status(
        &mut self,
        status: ConnectorStatus,
        error_code: Option<String>,
        timestamp: Option<DateTime<Utc>>,
    ) -> bool {
        if status == self.status && error_code == self.last_error_code {
            return false;
        }
        if let (Some(new_ts), Some(known_ts)) = (timestamp, self.last_status_at) {
            if new_ts < known_ts {
                return false;
            }
        }
        self.status = status;
        self.last_error_code = error_code;
        self.last_status_at = timestamp.or(self.last_status_at).or(Some(Utc::now()));
        true
    }
}

/// A charge point, identified by the opaque station id taken from the
/// WebSocket path. Created on first BootNotification (or lazily on first
/// message); never destroyed.
#[derive(Debug, Clone)]
pub struct Station {
    pub id: String,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub firmware_version: Option<String>,
    pub registration_status: RegistrationStatus,
    pub last_boot_at: Option<DateTime<Utc>>,
    pub last_heartbeat_at: Option<DateTime<Utc>>,
}

impl Station {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vendor: None,
            model: None,
            firmware_version: None,
            registration_status: RegistrationStatus::Pending,
            last_boot_at: None,
            last_heartbeat_at: None,
        }
    }

    /// Derived liveness per spec §3: "offline stations persist with status
    /// derived from heartbeat recency".
    pub fn is_online(&self, now: DateTime<Utc>, heartbeat_interval_secs: i64) -> bool {
        match self.last_heartbeat_at.or(self.last_boot_at) {
            Some(last) => (now - last).num_seconds() <= heartbeat_interval_secs * 3,
            None => false,
        }
    }
}

#[async_trait]
pub trait StationRepository: Send + Sync {
    async fn upsert_station(
        &self,
        id: &str,
        vendor: &str,
        model: &str,
        firmware_version: Option<&str>,
    ) -> DomainResult<Station>;
    async fn insert_boot(&self, id: &str, status: RegistrationStatus) -> DomainResult<()>;
    async fn update_heartbeat(&self, id: &str) -> DomainResult<DateTime<Utc>>;
    async fn get_station(&self, id: &str) -> DomainResult<Option<Station>>;
    async fn list_stations(&self) -> DomainResult<Vec<Station>>;
    async fn is_denylisted(&self, id: &str) -> DomainResult<bool>;

    async fn upsert_connector_status(
        &self,
        station_id: &str,
        connector_id: u32,
        status: ConnectorStatus,
        error_code: Option<&str>,
        timestamp: Option<DateTime<Utc>>,
    ) -> DomainResult<bool>;
    async fn get_connector(
        &self,
        station_id: &str,
        connector_id: u32,
    ) -> DomainResult<Option<Connector>>;

    /// Append a row to the `firmware_status` log (spec §6).
    async fn record_firmware_status(
        &self,
        station_id: &str,
        status: &str,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<()>;

    /// Append a row to the `diagnostics_status` log (spec §6).
    async fn record_diagnostics_status(
        &self,
        station_id: &str,
        status: &str,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_status_roundtrip() {
        for s in [
            ConnectorStatus::Available,
            ConnectorStatus::Preparing,
            ConnectorStatus::Charging,
            ConnectorStatus::SuspendedEVSE,
            ConnectorStatus::SuspendedEV,
            ConnectorStatus::Finishing,
            ConnectorStatus::Reserved,
            ConnectorStatus::Unavailable,
            ConnectorStatus::Faulted,
        ] {
            assert_eq!(ConnectorStatus::from_str(s.as_str()), Some(s));
        }
    }

    #[test]
    fn apply_status_noop_when_unchanged() {
        let mut c = Connector::new(1);
        let ts = Utc::now();
        assert!(c.apply_status(ConnectorStatus::Charging, None, Some(ts)));
        assert!(!c.apply_status(ConnectorStatus::Charging, None, Some(ts)));
    }

    #[test]
    fn apply_status_ignores_stale_timestamp() {
        let mut c = Connector::new(1);
        let now = Utc::now();
        let earlier = now - chrono::Duration::seconds(10);
        assert!(c.apply_status(ConnectorStatus::Charging, None, Some(now)));
        assert!(!c.apply_status(ConnectorStatus::Available, None, Some(earlier)));
        assert_eq!(c.status, ConnectorStatus::Charging);
    }

    #[test]
    fn apply_status_last_write_wins_without_timestamp() {
        let mut c = Connector::new(1);
        assert!(c.apply_status(ConnectorStatus::Charging, None, None));
        assert!(c.apply_status(ConnectorStatus::Available, None, None));
        assert_eq!(c.status, ConnectorStatus::Available);
    }

    #[test]
    fn station_offline_without_heartbeat() {
        let s = Station::new("CP1");
        assert!(!s.is_online(Utc::now(), 30));
    }

    #[test]
    fn station_online_within_heartbeat_window() {
        let mut s = Station::new("CP1");
        s.last_heartbeat_at = Some(Utc::now());
        assert!(s.is_online(Utc::now(), 30));
    }
}
