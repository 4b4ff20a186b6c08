//! Wire Codec — OCPP-J frame parsing/serialization and error codes.

pub mod error_code;
pub mod frame;

pub use error_code::OcppErrorCode;
pub use frame::{OcppFrame, OcppFrameError};
