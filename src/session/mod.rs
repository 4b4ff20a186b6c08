//! Session layer: per-connection state machine and Call Registry.

pub mod connection;
pub mod registry;

pub use connection::{run_session, Session, SessionState};
pub use registry::{CallError, CallRegistry};
