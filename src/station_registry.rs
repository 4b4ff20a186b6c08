//! Station Registry (spec §4.E) — process-wide map of connected stations.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{info, warn};

use crate::session::Session;

/// Outcome of registering a new Session for a station id.
pub enum AttachOutcome {
    /// No prior session existed for this station id.
    New,
    /// A second connection for the same station id evicted the first
    /// (spec §4.C, test scenario S6). The caller must close the evicted
    /// session's socket with WebSocket close code 1012 (Service Restart).
    Evicted(Arc<Session>),
}

/// Process-wide registry of connected stations, keyed by station id.
/// Attach/detach are linearizable per key via `DashMap`'s per-shard
/// locking.
pub struct StationRegistry {
    sessions: DashMap<String, Arc<Session>>,
}

pub type SharedStationRegistry = Arc<StationRegistry>;

impl StationRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn shared() -> SharedStationRegistry {
        Arc::new(Self::new())
    }

    /// Register a session for `station_id`, evicting any prior session.
    pub fn attach(&self, station_id: &str, session: Arc<Session>) -> AttachOutcome {
        let evicted = self.sessions.insert(station_id.to_string(), session);
        match evicted {
            Some(old) => {
                warn!(station_id, "evicting prior session for reconnect");
                AttachOutcome::Evicted(old)
            }
            None => {
                info!(station_id, "station attached");
                AttachOutcome::New
            }
        }
    }

    /// Remove a session, but only if it is still the one on record —
    /// prevents a stale disconnect task from unregistering a session that
    /// already replaced it.
    pub fn detach(&self, station_id: &str, session: &Arc<Session>) {
        self.sessions.remove_if(station_id, |_, current| {
            Arc::ptr_eq(current, session)
        });
    }

    pub fn get(&self, station_id: &str) -> Option<Arc<Session>> {
        self.sessions.get(station_id).map(|e| e.clone())
    }

    pub fn is_connected(&self, station_id: &str) -> bool {
        self.sessions.contains_key(station_id)
    }

    pub fn connected_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    pub fn snapshot(&self) -> Vec<Arc<Session>> {
        self.sessions.iter().map(|e| e.value().clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for StationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn fake_session(id: &str) -> Arc<Session> {
        let (tx, _rx) = mpsc::unbounded_channel();
        Arc::new(Session::new_for_test(id.to_string(), tx, Duration::from_secs(5)))
    }

    #[test]
    fn first_attach_is_new() {
        let reg = StationRegistry::new();
        match reg.attach("CP1", fake_session("CP1")) {
            AttachOutcome::New => {}
            _ => panic!("expected New"),
        }
        assert!(reg.is_connected("CP1"));
    }

    #[test]
    fn second_attach_evicts_first() {
        let reg = StationRegistry::new();
        let first = fake_session("CP1");
        reg.attach("CP1", first.clone());
        let second = fake_session("CP1");
        match reg.attach("CP1", second.clone()) {
            AttachOutcome::Evicted(old) => assert!(Arc::ptr_eq(&old, &first)),
            AttachOutcome::New => panic!("expected Evicted"),
        }
        assert!(Arc::ptr_eq(&reg.get("CP1").unwrap(), &second));
    }

    #[test]
    fn detach_ignores_stale_session() {
        let reg = StationRegistry::new();
        let first = fake_session("CP1");
        reg.attach("CP1", first.clone());
        let second = fake_session("CP1");
        reg.attach("CP1", second.clone());
        reg.detach("CP1", &first);
        assert!(reg.is_connected("CP1"));
        reg.detach("CP1", &second);
        assert!(!reg.is_connected("CP1"));
    }
}
