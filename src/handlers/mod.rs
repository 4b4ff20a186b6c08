//! Action Handlers (spec §4.D) — one module per OCPP 1.6 Action, dispatched
//! by name from a flat match rather than a trait-per-action hierarchy,
//! mirroring the teacher's `v16_action_matcher` dispatch table.

mod authorize;
mod boot_notification;
mod data_transfer;
mod diagnostics_status_notification;
mod firmware_status_notification;
mod heartbeat;
mod meter_values;
mod start_transaction;
mod status_notification;
mod stop_transaction;

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, warn};

use crate::config::Config;
use crate::domain::{AuthorizationRepository, ReservationRepository, StationRepository, TransactionRepository};
use crate::ocpp::OcppErrorCode;

/// Shared dependencies every Action Handler needs. Cloned cheaply (all
/// fields are `Arc`s) and handed to each handler invocation.
#[derive(Clone)]
pub struct HandlerContext {
    pub stations: Arc<dyn StationRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub authorizations: Arc<dyn AuthorizationRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub config: Arc<Config>,
}

/// Route one Call's action name + payload to its handler.
///
/// Returns the CallResult payload on success, or the OCPP error code to
/// report back as a CallError for malformed payloads / persistence
/// failures. CS→CP actions arriving from a station (protocol violation)
/// and genuinely unknown actions both report `NotImplemented`.
pub async fn dispatch(ctx: &HandlerContext, station_id: &str, action: &str, payload: Value) -> Result<Value, OcppErrorCode> {
    match action {
        "Authorize" => authorize::handle(ctx, station_id, payload).await,
        "BootNotification" => boot_notification::handle(ctx, station_id, payload).await,
        "DataTransfer" => data_transfer::handle(ctx, station_id, payload).await,
        "DiagnosticsStatusNotification" => diagnostics_status_notification::handle(ctx, station_id, payload).await,
        "FirmwareStatusNotification" => firmware_status_notification::handle(ctx, station_id, payload).await,
        "Heartbeat" => heartbeat::handle(ctx, station_id, payload).await,
        "MeterValues" => meter_values::handle(ctx, station_id, payload).await,
        "StartTransaction" => start_transaction::handle(ctx, station_id, payload).await,
        "StatusNotification" => status_notification::handle(ctx, station_id, payload).await,
        "StopTransaction" => stop_transaction::handle(ctx, station_id, payload).await,
        unknown => {
            if is_cs_to_cp_action(unknown) {
                warn!(station_id, action = unknown, "received CS\u{2192}CP action from station");
            } else {
                error!(station_id, action = unknown, "unknown OCPP 1.6 action");
            }
            Err(OcppErrorCode::NotImplemented)
        }
    }
}

fn is_cs_to_cp_action(action: &str) -> bool {
    matches!(
        action,
        "CancelReservation"
            | "ChangeAvailability"
            | "ChangeConfiguration"
            | "ClearCache"
            | "GetConfiguration"
            | "GetDiagnostics"
            | "GetLocalListVersion"
            | "RemoteStartTransaction"
            | "RemoteStopTransaction"
            | "ReserveNow"
            | "Reset"
            | "SendLocalList"
            | "TriggerMessage"
            | "UnlockConnector"
            | "UpdateFirmware"
    )
}

/// Deserialize a Call payload, mapping a failure to the closed error-code
/// set (spec §6) instead of letting serde's error leak into a CallResult.
fn parse_payload<T: serde::de::DeserializeOwned>(station_id: &str, action: &str, payload: Value) -> Result<T, OcppErrorCode> {
    serde_json::from_value(payload).map_err(|e| {
        warn!(station_id, action, error = %e, "malformed payload");
        OcppErrorCode::FormationViolation
    })
}
