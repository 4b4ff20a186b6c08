//! Per-Session Call Registry (spec §4.B).
//!
//! Each `Session` owns exactly one `CallRegistry`: at most one outstanding
//! Call per direction is in flight at a time, so the map never needs more
//! than a single pending entry for CS→CP calls. Kept as a map (rather than
//! a single `Option`) so CP→CS calls the station initiates share the same
//! expiry/timeout machinery without a second type.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::warn;

#[derive(Debug, Clone)]
pub enum CallError {
    NotConnected,
    SendFailed(String),
    Timeout,
    ChannelClosed,
    CallError { code: String, description: String },
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "session not connected"),
            Self::SendFailed(msg) => write!(f, "send failed: {}", msg),
            Self::Timeout => write!(f, "response timeout"),
            Self::ChannelClosed => write!(f, "response channel closed"),
            Self::CallError { code, description } => {
                write!(f, "CallError {}: {}", code, description)
            }
        }
    }
}

impl std::error::Error for CallError {}

struct Pending {
    action: String,
    reply: oneshot::Sender<Result<Value, CallError>>,
}

/// Tracks outstanding Calls for a single Session, keyed by the OCPP-J
/// unique id. Session-scoped, not process-wide: the station registry
/// holds one of these per connected station (spec §4.B).
pub struct CallRegistry {
    pending: DashMap<String, Pending>,
    counter: AtomicU64,
    call_timeout: Duration,
}

impl CallRegistry {
    pub fn new(call_timeout: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            counter: AtomicU64::new(1),
            call_timeout,
        }
    }

    pub fn next_message_id(&self) -> String {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("CS-{}", id)
    }

    /// Register a pending call and return a future that resolves when the
    /// matching CallResult/CallError arrives, or times out. `send` performs
    /// the actual write to the Session's outbound queue; it is passed in
    /// so the registration and the send happen under the same `unique_id`
    /// reservation without the caller racing a response against insertion.
    pub async fn call(
        &self,
        unique_id: String,
        action: &str,
        send: impl FnOnce() -> Result<(), String>,
    ) -> Result<Value, CallError> {
        let (tx, rx) = oneshot::channel();
        self.pending.insert(
            unique_id.clone(),
            Pending {
                action: action.to_string(),
                reply: tx,
            },
        );

        if let Err(e) = send() {
            self.pending.remove(&unique_id);
            return Err(CallError::SendFailed(e));
        }

        match timeout(self.call_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => {
                self.pending.remove(&unique_id);
                Err(CallError::ChannelClosed)
            }
            Err(_) => {
                self.pending.remove(&unique_id);
                Err(CallError::Timeout)
            }
        }
    }

    pub fn resolve(&self, unique_id: &str, payload: Value) {
        if let Some((_, pending)) = self.pending.remove(unique_id) {
            let _ = pending.reply.send(Ok(payload));
        } else {
            warn!(unique_id, "CallResult for unknown or expired call");
        }
    }

    pub fn reject(&self, unique_id: &str, code: String, description: String) {
        if let Some((_, pending)) = self.pending.remove(unique_id) {
            warn!(unique_id, action = pending.action.as_str(), code = code.as_str(), "CallError received");
            let _ = pending.reply.send(Err(CallError::CallError { code, description }));
        }
    }

    pub fn has_outstanding(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn clear(&self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn call_resolves_on_matching_result() {
        let registry = CallRegistry::new(Duration::from_secs(5));
        let id = registry.next_message_id();
        let registry = std::sync::Arc::new(registry);
        let r2 = registry.clone();
        let id2 = id.clone();
        tokio::spawn(async move {
            r2.resolve(&id2, serde_json::json!({"status": "Accepted"}));
        });
        let result = registry.call(id, "Reset", || Ok(())).await.unwrap();
        assert_eq!(result["status"], "Accepted");
    }

    #[tokio::test]
    async fn call_times_out_without_response() {
        let registry = CallRegistry::new(Duration::from_millis(20));
        let id = registry.next_message_id();
        let err = registry.call(id, "Reset", || Ok(())).await.unwrap_err();
        assert!(matches!(err, CallError::Timeout));
    }

    #[tokio::test]
    async fn call_fails_immediately_when_send_fails() {
        let registry = CallRegistry::new(Duration::from_secs(5));
        let id = registry.next_message_id();
        let err = registry
            .call(id, "Reset", || Err("not connected".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::SendFailed(_)));
        assert!(!registry.has_outstanding());
    }

    #[tokio::test]
    async fn reject_delivers_call_error() {
        let registry = CallRegistry::new(Duration::from_secs(5));
        let id = registry.next_message_id();
        let registry = std::sync::Arc::new(registry);
        let r2 = registry.clone();
        let id2 = id.clone();
        tokio::spawn(async move {
            r2.reject(&id2, "NotSupported".to_string(), "nope".to_string());
        });
        let err = registry.call(id, "Reset", || Ok(())).await.unwrap_err();
        match err {
            CallError::CallError { code, .. } => assert_eq!(code, "NotSupported"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
