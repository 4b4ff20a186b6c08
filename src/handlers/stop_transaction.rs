use rust_ocpp::v1_6::messages::stop_transaction::{StopTransactionRequest, StopTransactionResponse};
use rust_ocpp::v1_6::types::{AuthorizationStatus, IdTagInfo};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::ocpp::OcppErrorCode;

use super::HandlerContext;

pub async fn handle(ctx: &HandlerContext, station_id: &str, payload: Value) -> Result<Value, OcppErrorCode> {
    let req: StopTransactionRequest = super::parse_payload(station_id, "StopTransaction", payload)?;

    info!(
        station_id,
        transaction_id = req.transaction_id,
        meter_stop = req.meter_stop,
        "StopTransaction"
    );

    let reason = req.reason.as_ref().map(|r| format!("{:?}", r));

    match ctx
        .transactions
        .finalize_transaction(req.transaction_id, req.meter_stop, req.timestamp, reason)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!(station_id, transaction_id = req.transaction_id, "StopTransaction for unknown transaction");
        }
        Err(e) => {
            error!(station_id, transaction_id = req.transaction_id, error = %e, "failed to finalize transaction");
            return Err(OcppErrorCode::InternalError);
        }
    }

    let response = StopTransactionResponse {
        id_tag_info: Some(IdTagInfo {
            status: AuthorizationStatus::Accepted,
            expiry_date: None,
            parent_id_tag: None,
        }),
    };

    Ok(serde_json::to_value(&response).unwrap_or_default())
}
