pub mod authorization;
pub mod boot_event;
pub mod connector;
pub mod diagnostics_status;
pub mod firmware_status;
pub mod heartbeat;
pub mod meter_sample;
pub mod reservation;
pub mod station;
pub mod status_history;
pub mod transaction;
