use rust_ocpp::v1_6::messages::status_notification::{StatusNotificationRequest, StatusNotificationResponse};
use rust_ocpp::v1_6::types::ChargePointStatus as WireConnectorStatus;
use serde_json::Value;
use tracing::info;

use crate::domain::ConnectorStatus;
use crate::ocpp::OcppErrorCode;

use super::HandlerContext;

pub async fn handle(ctx: &HandlerContext, station_id: &str, payload: Value) -> Result<Value, OcppErrorCode> {
    let req: StatusNotificationRequest = super::parse_payload(station_id, "StatusNotification", payload)?;

    info!(
        station_id,
        connector_id = req.connector_id,
        status = ?req.status,
        error_code = ?req.error_code,
        "StatusNotification"
    );

    let status = match req.status {
        WireConnectorStatus::Available => ConnectorStatus::Available,
        WireConnectorStatus::Preparing => ConnectorStatus::Preparing,
        WireConnectorStatus::Charging => ConnectorStatus::Charging,
        WireConnectorStatus::SuspendedEV => ConnectorStatus::SuspendedEV,
        WireConnectorStatus::SuspendedEVSE => ConnectorStatus::SuspendedEVSE,
        WireConnectorStatus::Finishing => ConnectorStatus::Finishing,
        WireConnectorStatus::Reserved => ConnectorStatus::Reserved,
        WireConnectorStatus::Unavailable => ConnectorStatus::Unavailable,
        WireConnectorStatus::Faulted => ConnectorStatus::Faulted,
    };

    ctx.stations
        .upsert_connector_status(
            station_id,
            req.connector_id,
            status,
            Some(&format!("{:?}", req.error_code)),
            req.timestamp,
        )
        .await
        .map_err(|_| OcppErrorCode::InternalError)?;

    Ok(serde_json::to_value(&StatusNotificationResponse {}).unwrap_or_default())
}
