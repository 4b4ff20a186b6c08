use chrono::Utc;
use rust_ocpp::v1_6::messages::start_transaction::{StartTransactionRequest, StartTransactionResponse};
use rust_ocpp::v1_6::types::{AuthorizationStatus as WireAuthStatus, IdTagInfo};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::AuthFailPolicy;
use crate::ocpp::OcppErrorCode;

use super::HandlerContext;

/// StartTransaction retries within this window return the existing
/// transaction instead of opening a duplicate (spec §4.D, §9).
const IDEMPOTENCY_WINDOW_SECS: i64 = 60;

fn invalid_response() -> Value {
    serde_json::to_value(&StartTransactionResponse {
        transaction_id: 0,
        id_tag_info: IdTagInfo {
            status: WireAuthStatus::Invalid,
            expiry_date: None,
            parent_id_tag: None,
        },
    })
    .unwrap_or_default()
}

pub async fn handle(ctx: &HandlerContext, station_id: &str, payload: Value) -> Result<Value, OcppErrorCode> {
    let req: StartTransactionRequest = super::parse_payload(station_id, "StartTransaction", payload)?;

    info!(
        station_id,
        connector_id = req.connector_id,
        id_tag = req.id_tag.as_str(),
        meter_start = req.meter_start,
        "StartTransaction"
    );

    let record = ctx
        .authorizations
        .find(&req.id_tag)
        .await
        .map_err(|_| OcppErrorCode::InternalError)?;

    let authorized = match record {
        Some(rec) => matches!(
            rec.effective_status(req.timestamp),
            crate::domain::AuthorizationStatus::Accepted
        ),
        None => matches!(ctx.config.auth_fail_policy, AuthFailPolicy::AcceptUnknown),
    };

    if !authorized {
        return Ok(invalid_response());
    }

    if let Some(existing) = ctx
        .transactions
        .find_recent_start(
            station_id,
            req.connector_id,
            &req.id_tag,
            req.timestamp,
            IDEMPOTENCY_WINDOW_SECS,
        )
        .await
        .map_err(|_| OcppErrorCode::InternalError)?
    {
        warn!(station_id, connector_id = req.connector_id, "StartTransaction retry within idempotency window");
        let response = StartTransactionResponse {
            transaction_id: existing.id,
            id_tag_info: IdTagInfo {
                status: WireAuthStatus::Accepted,
                expiry_date: None,
                parent_id_tag: None,
            },
        };
        return Ok(serde_json::to_value(&response).unwrap_or_default());
    }

    let reservation_id = ctx
        .reservations
        .find_active_for_connector(station_id, req.connector_id, Utc::now())
        .await
        .map_err(|_| OcppErrorCode::InternalError)?
        .map(|r| r.id);

    let transaction = ctx
        .transactions
        .allocate_transaction(
            station_id,
            req.connector_id,
            &req.id_tag,
            req.meter_start,
            req.timestamp,
            reservation_id,
        )
        .await
        .map_err(|_| OcppErrorCode::InternalError)?;

    if let Some(id) = reservation_id {
        let _ = ctx.reservations.cancel(id).await;
    }

    let response = StartTransactionResponse {
        transaction_id: transaction.id,
        id_tag_info: IdTagInfo {
            status: WireAuthStatus::Accepted,
            expiry_date: None,
            parent_id_tag: None,
        },
    };

    Ok(serde_json::to_value(&response).unwrap_or_default())
}
