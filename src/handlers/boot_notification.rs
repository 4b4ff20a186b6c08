use chrono::Utc;
use rust_ocpp::v1_6::messages::boot_notification::{BootNotificationRequest, BootNotificationResponse};
use rust_ocpp::v1_6::types::RegistrationStatus as WireRegistrationStatus;
use serde_json::Value;
use tracing::info;

use crate::domain::RegistrationStatus;
use crate::ocpp::OcppErrorCode;

use super::HandlerContext;

pub async fn handle(ctx: &HandlerContext, station_id: &str, payload: Value) -> Result<Value, OcppErrorCode> {
    let req: BootNotificationRequest = super::parse_payload(station_id, "BootNotification", payload)?;

    info!(
        station_id,
        vendor = req.charge_point_vendor.as_str(),
        model = req.charge_point_model.as_str(),
        "BootNotification"
    );

    let station = ctx
        .stations
        .upsert_station(
            station_id,
            &req.charge_point_vendor,
            &req.charge_point_model,
            req.firmware_version.as_deref(),
        )
        .await
        .map_err(|_| OcppErrorCode::InternalError)?;

    ctx.stations
        .insert_boot(station_id, station.registration_status)
        .await
        .map_err(|_| OcppErrorCode::InternalError)?;

    let status = match station.registration_status {
        RegistrationStatus::Accepted => WireRegistrationStatus::Accepted,
        RegistrationStatus::Pending => WireRegistrationStatus::Pending,
        RegistrationStatus::Rejected => WireRegistrationStatus::Rejected,
    };

    let response = BootNotificationResponse {
        current_time: Utc::now(),
        interval: ctx.config.heartbeat_interval_secs as i32,
        status,
    };

    Ok(serde_json::to_value(&response).unwrap_or_default())
}
