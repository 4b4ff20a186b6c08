//! OCPP 1.6-J Central System entry point.
//!
//! Reads configuration from the environment, connects to the database,
//! runs pending migrations, then serves station WebSocket connections and
//! the health check on one listen address until a shutdown signal arrives.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use ocpp_cs::config::Config;
use ocpp_cs::handlers::HandlerContext;
use ocpp_cs::repository::migrator::Migrator;
use ocpp_cs::repository::{
    SeaOrmAuthorizationRepository, SeaOrmReservationRepository, SeaOrmStationRepository,
    SeaOrmTransactionRepository,
};
use ocpp_cs::shutdown::ShutdownCoordinator;
use ocpp_cs::station_registry::StationRegistry;
use ocpp_cs::{build_router, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!(listen_addr = %config.listen_addr, db_url = %config.db_url, "starting OCPP central system");

    let db = match sea_orm::Database::connect(&config.db_url).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "failed to connect to database");
            return ExitCode::from(1);
        }
    };

    info!("running database migrations");
    if let Err(e) = Migrator::up(&db, None).await {
        error!(error = %e, "failed to run migrations");
        return ExitCode::from(1);
    }

    let stations = Arc::new(SeaOrmStationRepository::new(db.clone()));
    let transactions = Arc::new(SeaOrmTransactionRepository::new(db.clone()));
    let authorizations = Arc::new(SeaOrmAuthorizationRepository::new(db.clone()));
    let reservations = Arc::new(SeaOrmReservationRepository::new(db.clone()));

    let config = Arc::new(config);
    let handlers = HandlerContext {
        stations,
        transactions,
        authorizations,
        reservations,
        config: config.clone(),
    };

    let registry = StationRegistry::shared();

    let shutdown = ShutdownCoordinator::new(15);
    shutdown.start_signal_listener();
    let shutdown_signal = shutdown.signal();

    let state = AppState {
        registry: registry.clone(),
        handlers,
        call_timeout: Duration::from_secs(config.call_timeout_secs),
    };
    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %config.listen_addr, "failed to bind listen address");
            return ExitCode::from(1);
        }
    };
    info!(addr = %config.listen_addr, "listening for station connections");

    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("shutdown signal received, draining connections");
        })
        .await;

    if let Err(e) = serve_result {
        error!(error = %e, "server error");
        return ExitCode::from(1);
    }

    for session in registry.snapshot() {
        session.close(1001, "server shutting down");
    }

    if let Err(e) = db.close().await {
        warn!(error = %e, "error closing database connection");
    }

    info!("shutdown complete");
    ExitCode::SUCCESS
}
