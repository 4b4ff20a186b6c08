//! Listener (spec §4.G) — the single axum router that accepts charge point
//! WebSocket connections and serves the health check, replacing the
//! teacher's dual `OcppServer` (raw `TcpListener` + `tokio-tungstenite`)
//! with one `axum::Router`. Subprotocol negotiation and path-based station
//! id extraction follow the same shape as `interfaces/ws/ocpp_server.rs`,
//! re-expressed through axum's WebSocket extractor.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handlers::{self, HandlerContext};
use crate::ocpp::frame::OcppFrame;
use crate::session::{run_session, Session};
use crate::station_registry::SharedStationRegistry;

const OCPP_SUBPROTOCOL: &str = "ocpp1.6";

#[derive(Clone)]
pub struct AppState {
    pub registry: SharedStationRegistry,
    pub handlers: HandlerContext,
    pub call_timeout: Duration,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/{station_id}", get(ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    "OK"
}

async fn ws_upgrade(
    Path(station_id): Path<String>,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    info!(station_id, "accepting station connection");
    let registry = state.registry.clone();
    let handlers = state.handlers.clone();
    let call_timeout = state.call_timeout;
    ws.protocols([OCPP_SUBPROTOCOL]).on_upgrade(move |socket| async move {
        run_session(station_id, socket, call_timeout, registry, move |session, frame| {
            let handlers = handlers.clone();
            async move {
                handle_call(&handlers, session, frame).await;
            }
        })
        .await;
    })
}

/// Dispatch one inbound Call frame to the Action Handlers and send back
/// the matching CallResult/CallError.
async fn handle_call(ctx: &HandlerContext, session: Arc<Session>, frame: OcppFrame) {
    let OcppFrame::Call {
        unique_id,
        action,
        payload,
    } = frame
    else {
        return;
    };

    let response: Result<Value, crate::ocpp::OcppErrorCode> =
        handlers::dispatch(ctx, &session.station_id, &action, payload).await;

    let out = match response {
        Ok(result) => OcppFrame::CallResult {
            unique_id,
            payload: result,
        },
        Err(code) => OcppFrame::error_response(unique_id, code.as_str(), code.to_string()),
    };

    if let Err(e) = session.send(&out) {
        warn!(station_id = session.station_id.as_str(), error = %e, "failed to send response");
    }
}
