use rust_ocpp::v1_6::messages::heart_beat::HeartbeatResponse;
use serde_json::Value;
use tracing::info;

use crate::ocpp::OcppErrorCode;

use super::HandlerContext;

pub async fn handle(ctx: &HandlerContext, station_id: &str, _payload: Value) -> Result<Value, OcppErrorCode> {
    info!(station_id, "Heartbeat");

    let current_time = ctx
        .stations
        .update_heartbeat(station_id)
        .await
        .map_err(|_| OcppErrorCode::InternalError)?;

    Ok(serde_json::to_value(&HeartbeatResponse { current_time }).unwrap_or_default())
}
