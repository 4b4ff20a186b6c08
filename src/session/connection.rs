//! Session — the per-connection state machine (spec §4.C).
//!
//! A Session owns one WebSocket, one `CallRegistry`, and a single-item
//! outbound serialization queue so at most one CS→CP Call is in flight at
//! a time. Reader and writer run as separate tasks, mirroring the
//! teacher's `handle_connection` split into `send_task`/`recv_task`, but
//! re-hosted on `axum::extract::ws` instead of raw `tokio-tungstenite`.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::ocpp::error_code::OcppErrorCode;
use crate::ocpp::frame::OcppFrame;

use super::registry::CallRegistry;

/// WebSocket keepalive cadence (spec §5): ping every 20s, and if no
/// activity (pong or any inbound frame) is seen within 30s the connection
/// is presumed dead and closed with code 1006.
const PING_INTERVAL_SECS: u64 = 20;
const PONG_TIMEOUT_SECS: i64 = 30;

/// Lifecycle states a Session moves through (spec §4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Subprotocol negotiated, handshake accepted, no traffic yet.
    Negotiating,
    /// Normal operation.
    Active,
    /// Server-initiated shutdown in progress; no new Calls are started.
    Draining,
    /// Reader and writer tasks have both stopped.
    Closed,
}

impl SessionState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Negotiating,
            1 => Self::Active,
            2 => Self::Draining,
            _ => Self::Closed,
        }
    }
}

/// A connected charge point's session. Cheap to clone (wraps an `Arc`
/// internally via the registry that owns it); methods take `&self`.
pub struct Session {
    pub station_id: String,
    state: AtomicU8,
    outbound: mpsc::UnboundedSender<Message>,
    pub calls: CallRegistry,
    pub connected_at: DateTime<Utc>,
    last_activity: Mutex<DateTime<Utc>>,
}

impl Session {
    fn new(station_id: String, outbound: mpsc::UnboundedSender<Message>, call_timeout: Duration) -> Self {
        Self::new_internal(station_id, outbound, call_timeout)
    }

    #[cfg(test)]
    pub fn new_for_test(
        station_id: String,
        outbound: mpsc::UnboundedSender<Message>,
        call_timeout: Duration,
    ) -> Self {
        Self::new_internal(station_id, outbound, call_timeout)
    }

    fn new_internal(station_id: String, outbound: mpsc::UnboundedSender<Message>, call_timeout: Duration) -> Self {
        let now = Utc::now();
        Self {
            station_id,
            state: AtomicU8::new(SessionState::Negotiating as u8),
            outbound,
            calls: CallRegistry::new(call_timeout),
            connected_at: now,
            last_activity: Mutex::new(now),
        }
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: SessionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn begin_draining(&self) {
        self.set_state(SessionState::Draining);
    }

    pub fn touch(&self) {
        *self.last_activity.lock().unwrap() = Utc::now();
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.lock().unwrap()
    }

    pub fn is_stale(&self, timeout_secs: i64) -> bool {
        (Utc::now() - self.last_activity()).num_seconds() > timeout_secs
    }

    /// Enqueue a frame on the outbound queue. Fails if the writer task has
    /// already stopped (connection gone).
    pub fn send(&self, frame: &OcppFrame) -> Result<(), String> {
        self.outbound
            .send(Message::Text(frame.serialize()))
            .map_err(|_| "session closed".to_string())
    }

    /// Enqueue a WebSocket ping frame (spec §5 keepalive).
    fn send_ping(&self) -> Result<(), String> {
        self.outbound
            .send(Message::Ping(Vec::new().into()))
            .map_err(|_| "session closed".to_string())
    }

    /// Close the underlying socket with the given WebSocket close code,
    /// used to evict a stale connection on reconnect (spec §4.C, scenario
    /// S6: 1012 Service Restart) or during graceful shutdown.
    pub fn close(&self, code: u16, reason: impl Into<String>) {
        self.begin_draining();
        let _ = self.outbound.send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into().into(),
        })));
    }

    /// Send a Call and await its response through the session's own
    /// `CallRegistry`, enforcing at most one outstanding CS→CP call.
    pub async fn call(
        &self,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, super::registry::CallError> {
        if self.state() == SessionState::Draining || self.state() == SessionState::Closed {
            return Err(super::registry::CallError::NotConnected);
        }
        let unique_id = self.calls.next_message_id();
        let frame = OcppFrame::Call {
            unique_id: unique_id.clone(),
            action: action.to_string(),
            payload,
        };
        let outbound = &self.outbound;
        self.calls
            .call(unique_id, action, || {
                outbound
                    .send(Message::Text(frame.serialize()))
                    .map_err(|_| "session closed".to_string())
            })
            .await
    }
}

/// Drive a single Session's reader/writer tasks until the socket closes.
/// `on_message` is invoked for every inbound text frame that is not a
/// CallResult/CallError resolved internally by `session.calls`; it
/// receives the parsed frame and the shared `Session` handle so handlers
/// can reply or initiate their own Calls.
pub async fn run_session<F, Fut>(
    station_id: String,
    socket: WebSocket,
    call_timeout: Duration,
    registry: crate::station_registry::SharedStationRegistry,
    on_message: F,
) where
    F: Fn(std::sync::Arc<Session>, OcppFrame) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let session = std::sync::Arc::new(Session::new(station_id.clone(), tx, call_timeout));
    session.set_state(SessionState::Active);

    if let crate::station_registry::AttachOutcome::Evicted(old) = registry.attach(&station_id, session.clone()) {
        old.close(1012, "replaced by new connection");
    }

    let write_id = station_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = ws_sender.send(msg).await {
                error!(station_id = write_id.as_str(), error = %e, "write failed");
                break;
            }
        }
    });

    let read_id = station_id.clone();
    let read_session = session.clone();
    let reader = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    read_session.touch();
                    match OcppFrame::parse(&text) {
                        Ok(frame) => dispatch_inbound(&read_session, frame, &on_message).await,
                        Err(e) => {
                            warn!(station_id = read_id.as_str(), error = %e, "malformed frame");
                            let unique_id = OcppFrame::extract_unique_id(&text).unwrap_or_else(|| "-1".to_string());
                            let out = OcppFrame::error_response(
                                unique_id,
                                OcppErrorCode::FormationViolation.as_str(),
                                e.to_string(),
                            );
                            if read_session.send(&out).is_err() {
                                warn!(station_id = read_id.as_str(), "failed to send FormationViolation response");
                            }
                        }
                    }
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    read_session.touch();
                }
                Ok(Message::Close(_)) => {
                    debug!(station_id = read_id.as_str(), "close frame received");
                    break;
                }
                Ok(Message::Binary(data)) => {
                    warn!(station_id = read_id.as_str(), bytes = data.len(), "ignoring binary frame");
                }
                Err(e) => {
                    error!(station_id = read_id.as_str(), error = %e, "read error");
                    break;
                }
            }
        }
    });

    let ping_id = station_id.clone();
    let ping_session = session.clone();
    let pinger = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if ping_session.is_stale(PONG_TIMEOUT_SECS) {
                warn!(station_id = ping_id.as_str(), "no pong within timeout, closing connection");
                ping_session.close(1006, "ping timeout");
                break;
            }
            if ping_session.send_ping().is_err() {
                break;
            }
        }
    });

    tokio::select! {
        _ = writer => {},
        _ = reader => {},
        _ = pinger => {},
    }

    session.set_state(SessionState::Closed);
    session.calls.clear();
    registry.detach(&station_id, &session);
    info!(station_id = station_id.as_str(), "session closed");
}

async fn dispatch_inbound<F, Fut>(
    session: &std::sync::Arc<Session>,
    frame: OcppFrame,
    on_message: &F,
) where
    F: Fn(std::sync::Arc<Session>, OcppFrame) -> Fut,
    Fut: Future<Output = ()>,
{
    match &frame {
        OcppFrame::CallResult { unique_id, payload } => {
            session.calls.resolve(unique_id, payload.clone());
        }
        OcppFrame::CallError {
            unique_id,
            error_code,
            error_description,
            ..
        } => {
            session
                .calls
                .reject(unique_id, error_code.clone(), error_description.clone());
        }
        OcppFrame::Call { .. } => {
            on_message(session.clone(), frame).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_starts_negotiating_then_active_on_send_path() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = Session::new("CP1".into(), tx, Duration::from_secs(5));
        assert_eq!(session.state(), SessionState::Negotiating);
        session.set_state(SessionState::Active);
        assert_eq!(session.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn draining_session_rejects_new_calls() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = Session::new("CP1".into(), tx, Duration::from_secs(5));
        session.begin_draining();
        let err = session.call("Reset", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, crate::session::registry::CallError::NotConnected));
    }

    #[tokio::test]
    async fn touch_updates_last_activity() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = Session::new("CP1".into(), tx, Duration::from_secs(5));
        assert!(!session.is_stale(3600));
        session.touch();
        assert!(!session.is_stale(3600));
    }
}
