use chrono::Utc;
use rust_ocpp::v1_6::messages::firmware_status_notification::{
    FirmwareStatusNotificationRequest, FirmwareStatusNotificationResponse,
};
use serde_json::Value;
use tracing::info;

use crate::ocpp::OcppErrorCode;

use super::HandlerContext;

pub async fn handle(ctx: &HandlerContext, station_id: &str, payload: Value) -> Result<Value, OcppErrorCode> {
    let req: FirmwareStatusNotificationRequest =
        super::parse_payload(station_id, "FirmwareStatusNotification", payload)?;

    info!(station_id, status = ?req.status, "FirmwareStatusNotification");

    ctx.stations
        .record_firmware_status(station_id, &format!("{:?}", req.status), Utc::now())
        .await
        .map_err(|_| OcppErrorCode::InternalError)?;

    Ok(serde_json::to_value(&FirmwareStatusNotificationResponse {}).unwrap_or_default())
}
