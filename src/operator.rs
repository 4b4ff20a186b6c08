//! Operator Adapter (spec §4.H) — the one place CS→CP Calls originate.
//!
//! Each function builds one OCPP 1.6 Call, sends it through the target
//! station's `Session` (which enforces the one-outstanding-call-per-session
//! invariant and the configured timeout), and maps the response back to a
//! plain status. Grounded on the teacher's `application/commands/*`
//! modules, re-expressed against the per-session `Session::call` instead of
//! a global `CommandSender`.

use rust_ocpp::v1_6::messages::cancel_reservation::{CancelReservationRequest, CancelReservationResponse};
use rust_ocpp::v1_6::messages::change_configuration::{ChangeConfigurationRequest, ChangeConfigurationResponse};
use rust_ocpp::v1_6::messages::get_configuration::{GetConfigurationRequest, GetConfigurationResponse};
use rust_ocpp::v1_6::messages::remote_start_transaction::{RemoteStartTransactionRequest, RemoteStartTransactionResponse};
use rust_ocpp::v1_6::messages::remote_stop_transaction::{RemoteStopTransactionRequest, RemoteStopTransactionResponse};
use rust_ocpp::v1_6::messages::reserve_now::{ReserveNowRequest, ReserveNowResponse};
use rust_ocpp::v1_6::messages::reset::{ResetRequest, ResetResponse};
use rust_ocpp::v1_6::types::{CancelReservationStatus, ConfigurationStatus, KeyValue, RemoteStartStopStatus, ResetRequestStatus};
use thiserror::Error;
use tracing::{info, warn};

use crate::session::CallError;
use crate::station_registry::SharedStationRegistry;

/// Errors an Operator Adapter call can fail with (spec §4.H, §7).
#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("station {0} is not connected")]
    StationOffline(String),
    #[error("call failed: {0}")]
    Call(#[from] CallError),
    #[error("malformed response from station: {0}")]
    InvalidResponse(String),
}

/// Kind of reset to request (spec §4.H), distinct from OCPP's own
/// `ResetType` so the operator surface doesn't leak a wire type.
#[derive(Debug, Clone, Copy)]
pub enum ResetKind {
    Soft,
    Hard,
}

impl From<ResetKind> for ResetRequestStatus {
    fn from(kind: ResetKind) -> Self {
        match kind {
            ResetKind::Soft => ResetRequestStatus::Soft,
            ResetKind::Hard => ResetRequestStatus::Hard,
        }
    }
}

async fn call<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
    registry: &SharedStationRegistry,
    station_id: &str,
    action: &str,
    request: Req,
) -> Result<Resp, OperatorError> {
    let session = registry
        .get(station_id)
        .ok_or_else(|| OperatorError::StationOffline(station_id.to_string()))?;

    let payload = serde_json::to_value(&request)
        .map_err(|e| OperatorError::InvalidResponse(e.to_string()))?;

    info!(station_id, action, "sending operator command");
    let response = session.call(action, payload).await?;

    serde_json::from_value(response).map_err(|e| OperatorError::InvalidResponse(e.to_string()))
}

pub async fn remote_start(
    registry: &SharedStationRegistry,
    station_id: &str,
    connector_id: Option<u32>,
    id_tag: &str,
) -> Result<RemoteStartStopStatus, OperatorError> {
    let request = RemoteStartTransactionRequest {
        connector_id,
        id_tag: id_tag.to_string(),
        charging_profile: None,
    };
    let response: RemoteStartTransactionResponse =
        call(registry, station_id, "RemoteStartTransaction", request).await?;
    Ok(response.status)
}

pub async fn remote_stop(
    registry: &SharedStationRegistry,
    station_id: &str,
    transaction_id: i32,
) -> Result<RemoteStartStopStatus, OperatorError> {
    let request = RemoteStopTransactionRequest { transaction_id };
    let response: RemoteStopTransactionResponse =
        call(registry, station_id, "RemoteStopTransaction", request).await?;
    Ok(response.status)
}

pub async fn reset(
    registry: &SharedStationRegistry,
    station_id: &str,
    kind: ResetKind,
) -> Result<ResetRequestStatus, OperatorError> {
    let request = ResetRequest { kind: kind.into() };
    let response: ResetResponse = call(registry, station_id, "Reset", request).await?;
    Ok(response.status)
}

pub async fn get_configuration(
    registry: &SharedStationRegistry,
    station_id: &str,
    keys: Option<Vec<String>>,
) -> Result<(Option<Vec<KeyValue>>, Option<Vec<String>>), OperatorError> {
    let request = GetConfigurationRequest { key: keys };
    let response: GetConfigurationResponse = call(registry, station_id, "GetConfiguration", request).await?;
    Ok((response.configuration_key, response.unknown_key))
}

pub async fn change_configuration(
    registry: &SharedStationRegistry,
    station_id: &str,
    key: &str,
    value: &str,
) -> Result<ConfigurationStatus, OperatorError> {
    let request = ChangeConfigurationRequest {
        key: key.to_string(),
        value: value.to_string(),
    };
    let response: ChangeConfigurationResponse =
        call(registry, station_id, "ChangeConfiguration", request).await?;
    Ok(response.status)
}

pub async fn reserve_now(
    registry: &SharedStationRegistry,
    station_id: &str,
    connector_id: u32,
    expiry_date: chrono::DateTime<chrono::Utc>,
    id_tag: &str,
    reservation_id: i32,
    parent_id_tag: Option<String>,
) -> Result<crate::domain::ReservationStatus, OperatorError> {
    let request = ReserveNowRequest {
        connector_id,
        expiry_date,
        id_tag: id_tag.to_string(),
        parent_id_tag,
        reservation_id,
    };
    let response: ReserveNowResponse = call(registry, station_id, "ReserveNow", request).await?;
    map_reservation_status(response.status)
}

fn map_reservation_status(
    status: rust_ocpp::v1_6::types::ReservationStatus,
) -> Result<crate::domain::ReservationStatus, OperatorError> {
    use rust_ocpp::v1_6::types::ReservationStatus as Wire;
    Ok(match status {
        Wire::Accepted => crate::domain::ReservationStatus::Accepted,
        Wire::Faulted => crate::domain::ReservationStatus::Faulted,
        Wire::Occupied => crate::domain::ReservationStatus::Occupied,
        Wire::Rejected => crate::domain::ReservationStatus::Rejected,
        Wire::Unavailable => crate::domain::ReservationStatus::Unavailable,
    })
}

pub async fn cancel_reservation(
    registry: &SharedStationRegistry,
    station_id: &str,
    reservation_id: i32,
) -> Result<CancelReservationStatus, OperatorError> {
    let request = CancelReservationRequest { reservation_id };
    let response: CancelReservationResponse =
        call(registry, station_id, "CancelReservation", request).await?;
    Ok(response.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station_registry::StationRegistry;
    use std::sync::Arc;

    #[tokio::test]
    async fn remote_start_fails_fast_when_station_offline() {
        let registry: SharedStationRegistry = Arc::new(StationRegistry::new());
        let err = remote_start(&registry, "CP-GHOST", None, "TAG1").await.unwrap_err();
        assert!(matches!(err, OperatorError::StationOffline(_)));
    }
}
