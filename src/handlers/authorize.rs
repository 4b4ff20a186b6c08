use chrono::Utc;
use rust_ocpp::v1_6::messages::authorize::{AuthorizeRequest, AuthorizeResponse};
use rust_ocpp::v1_6::types::{AuthorizationStatus as WireAuthStatus, IdTagInfo};
use serde_json::Value;
use tracing::info;

use crate::config::AuthFailPolicy;
use crate::domain::AuthorizationStatus;
use crate::ocpp::OcppErrorCode;

use super::HandlerContext;

pub async fn handle(ctx: &HandlerContext, station_id: &str, payload: Value) -> Result<Value, OcppErrorCode> {
    let req: AuthorizeRequest = super::parse_payload(station_id, "Authorize", payload)?;

    info!(station_id, id_tag = req.id_tag.as_str(), "Authorize");

    let record = ctx
        .authorizations
        .find(&req.id_tag)
        .await
        .map_err(|_| OcppErrorCode::InternalError)?;

    let status = match record {
        Some(rec) => to_wire_status(rec.effective_status(Utc::now())),
        None => match ctx.config.auth_fail_policy {
            AuthFailPolicy::AcceptUnknown => WireAuthStatus::Accepted,
            AuthFailPolicy::RejectUnknown => WireAuthStatus::Invalid,
        },
    };

    let response = AuthorizeResponse {
        id_tag_info: IdTagInfo {
            status,
            expiry_date: None,
            parent_id_tag: None,
        },
    };

    Ok(serde_json::to_value(&response).unwrap_or_default())
}

fn to_wire_status(status: AuthorizationStatus) -> WireAuthStatus {
    match status {
        AuthorizationStatus::Accepted => WireAuthStatus::Accepted,
        AuthorizationStatus::Blocked => WireAuthStatus::Blocked,
        AuthorizationStatus::Expired => WireAuthStatus::Expired,
        AuthorizationStatus::Invalid => WireAuthStatus::Invalid,
        AuthorizationStatus::ConcurrentTx => WireAuthStatus::ConcurrentTx,
    }
}
