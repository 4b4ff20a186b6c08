//! Reservation domain entity (spec §3, ReserveNow/CancelReservation via the Operator Adapter).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Accepted,
    Faulted,
    Occupied,
    Rejected,
    Unavailable,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Faulted => "Faulted",
            Self::Occupied => "Occupied",
            Self::Rejected => "Rejected",
            Self::Unavailable => "Unavailable",
        }
    }
}

/// A connector hold created by ReserveNow, cleared by CancelReservation,
/// StartTransaction on the same connector, or expiry.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: i32,
    pub station_id: String,
    pub connector_id: u32,
    pub id_tag: String,
    pub expiry_date: DateTime<Utc>,
    pub parent_id_tag: Option<String>,
    pub cancelled: bool,
}

impl Reservation {
    pub fn new(
        id: i32,
        station_id: impl Into<String>,
        connector_id: u32,
        id_tag: impl Into<String>,
        expiry_date: DateTime<Utc>,
        parent_id_tag: Option<String>,
    ) -> Self {
        Self {
            id,
            station_id: station_id.into(),
            connector_id,
            id_tag: id_tag.into(),
            expiry_date,
            parent_id_tag,
            cancelled: false,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_date
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.cancelled && !self.is_expired(now)
    }
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn create(&self, reservation: Reservation) -> DomainResult<Reservation>;
    async fn find_active_for_connector(
        &self,
        station_id: &str,
        connector_id: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<Reservation>>;
    async fn cancel(&self, id: i32) -> DomainResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Reservation {
        Reservation::new(1, "CP1", 1, "TAG1", Utc::now() + Duration::minutes(30), None)
    }

    #[test]
    fn fresh_reservation_is_active() {
        let r = sample();
        assert!(r.is_active(Utc::now()));
        assert!(!r.is_expired(Utc::now()));
    }

    #[test]
    fn expired_reservation_is_not_active() {
        let mut r = sample();
        r.expiry_date = Utc::now() - Duration::seconds(1);
        assert!(r.is_expired(Utc::now()));
        assert!(!r.is_active(Utc::now()));
    }

    #[test]
    fn cancelled_reservation_is_not_active_even_if_unexpired() {
        let mut r = sample();
        r.cancelled = true;
        assert!(!r.is_active(Utc::now()));
    }
}
