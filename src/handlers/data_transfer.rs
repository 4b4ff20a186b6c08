use rust_ocpp::v1_6::messages::data_transfer::{DataTransferRequest, DataTransferResponse};
use rust_ocpp::v1_6::types::DataTransferStatus;
use serde_json::Value;
use tracing::info;

use crate::ocpp::OcppErrorCode;

use super::HandlerContext;

pub async fn handle(_ctx: &HandlerContext, station_id: &str, payload: Value) -> Result<Value, OcppErrorCode> {
    let req: DataTransferRequest = super::parse_payload(station_id, "DataTransfer", payload)?;

    info!(
        station_id,
        vendor_id = req.vendor_string.as_str(),
        message_id = ?req.message_id,
        "DataTransfer"
    );

    // No vendor handlers are registered, so every DataTransfer is
    // unrecognized (spec §4.D).
    let response = DataTransferResponse {
        status: DataTransferStatus::UnknownVendorId,
        data: None,
    };

    Ok(serde_json::to_value(&response).unwrap_or_default())
}
