//! Domain layer - core business entities and types

pub mod authorization;
pub mod error;
pub mod reservation;
pub mod station;
pub mod transaction;

pub use authorization::{AuthorizationRecord, AuthorizationRepository, AuthorizationStatus};
pub use error::{DomainError, DomainResult, RepositoryError, RepositoryResult};
pub use reservation::{Reservation, ReservationRepository, ReservationStatus};
pub use station::{
    Connector, ConnectorStatus, RegistrationStatus, Station, StationRepository,
};
pub use transaction::{MeterSample, Transaction, TransactionRepository};
