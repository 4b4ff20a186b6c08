use chrono::Utc;
use rust_ocpp::v1_6::messages::diagnostics_status_notification::{
    DiagnosticsStatusNotificationRequest, DiagnosticsStatusNotificationResponse,
};
use serde_json::Value;
use tracing::info;

use crate::ocpp::OcppErrorCode;

use super::HandlerContext;

pub async fn handle(ctx: &HandlerContext, station_id: &str, payload: Value) -> Result<Value, OcppErrorCode> {
    let req: DiagnosticsStatusNotificationRequest =
        super::parse_payload(station_id, "DiagnosticsStatusNotification", payload)?;

    info!(station_id, status = ?req.status, "DiagnosticsStatusNotification");

    ctx.stations
        .record_diagnostics_status(station_id, &format!("{:?}", req.status), Utc::now())
        .await
        .map_err(|_| OcppErrorCode::InternalError)?;

    Ok(serde_json::to_value(&DiagnosticsStatusNotificationResponse {}).unwrap_or_default())
}
