use rust_ocpp::v1_6::messages::meter_values::{MeterValuesRequest, MeterValuesResponse};
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::MeterSample;
use crate::ocpp::OcppErrorCode;

use super::HandlerContext;

/// Append meter samples, honoring `METER_BUFFER` as a per-call cap: a
/// charge point that reports more samples than the configured buffer in
/// a single Call has the oldest of them dropped rather than rejecting the
/// whole message (spec §5 backpressure policy).
pub async fn handle(ctx: &HandlerContext, station_id: &str, payload: Value) -> Result<Value, OcppErrorCode> {
    let req: MeterValuesRequest = super::parse_payload(station_id, "MeterValues", payload)?;

    info!(
        station_id,
        connector_id = req.connector_id,
        transaction_id = ?req.transaction_id,
        samples = req.meter_value.len(),
        "MeterValues"
    );

    let transaction_id = match req.transaction_id {
        Some(id) => id,
        None => {
            warn!(station_id, connector_id = req.connector_id, "MeterValues without transactionId, dropping samples");
            return Ok(serde_json::to_value(&MeterValuesResponse {}).unwrap_or_default());
        }
    };

    let mut samples = Vec::new();
    for mv in &req.meter_value {
        for sampled in &mv.sampled_value {
            samples.push(MeterSample {
                transaction_id,
                timestamp: mv.timestamp,
                measurand: sampled
                    .measurand
                    .as_ref()
                    .map(|m| format!("{:?}", m))
                    .unwrap_or_else(|| "Energy.Active.Import.Register".to_string()),
                phase: sampled.phase.as_ref().map(|p| format!("{:?}", p)),
                unit: sampled.unit.as_ref().map(|u| format!("{:?}", u)),
                value: sampled.value.clone(),
            });
        }
    }

    let dropped = samples.len().saturating_sub(ctx.config.meter_buffer);
    if dropped > 0 {
        warn!(station_id, dropped, cap = ctx.config.meter_buffer, "dropping oldest meter samples over buffer cap");
        samples.drain(0..dropped);
    }

    ctx.transactions
        .append_meter_samples(samples)
        .await
        .map_err(|_| OcppErrorCode::InternalError)?;

    Ok(serde_json::to_value(&MeterValuesResponse {}).unwrap_or_default())
}
