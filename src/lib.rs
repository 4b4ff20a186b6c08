//! # OCPP 1.6-J Central System
//!
//! A Central System backend for managing electric vehicle charging
//! stations over the OCPP 1.6 JSON WebSocket protocol.
//!
//! ## Architecture
//!
//! - **ocpp**: Wire codec — OCPP-J frame parsing/serialization and error codes.
//! - **session**: Per-connection state machine and Call Registry.
//! - **station_registry**: Process-wide map of connected stations.
//! - **handlers**: Action Handlers, one per CP→CS OCPP action.
//! - **operator**: CS→CP command adapter (RemoteStart, Reset, ReserveNow, ...).
//! - **domain**: Core business entities, traits, and value objects.
//! - **repository**: SeaORM-backed and in-memory persistence.
//! - **listener**: The axum router accepting station connections.
//! - **config**: Environment-sourced application configuration.
//! - **shutdown**: Graceful shutdown coordination.

pub mod config;
pub mod domain;
pub mod handlers;
pub mod listener;
pub mod ocpp;
pub mod operator;
pub mod repository;
pub mod session;
pub mod shutdown;
pub mod station_registry;

pub use config::Config;
pub use listener::{build_router, AppState};
pub use station_registry::{SharedStationRegistry, StationRegistry};
