//! Persistence layer: SeaORM entities/migrations backing SQLite, plus an
//! in-memory implementation of the same repository traits for tests.

pub mod entities;
pub mod memory;
pub mod migrator;
pub mod sea_orm;

pub use self::sea_orm::{
    SeaOrmAuthorizationRepository, SeaOrmReservationRepository, SeaOrmStationRepository,
    SeaOrmTransactionRepository,
};
