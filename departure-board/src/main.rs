use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use departure_board::config::{ConfigError, Settings};
use departure_board::opendata::{ClientError, TransportClient, TransportConfig};
use departure_board::registry::StationRegistry;
use departure_board::setup::configure_station;
use departure_board::web::{AppState, create_router};

/// Errors that stop the process.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("no station could be set up")]
    NoStations,

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "departure board stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let settings = Settings::from_env()?;

    let client = TransportClient::new(TransportConfig::new().with_base_url(&settings.api_base))?;
    let registry = StationRegistry::new();

    for entry in &settings.stations {
        if let Err(e) = configure_station(&client, &registry, entry).await {
            error!(station = %entry.station, error = %e, "station setup failed");
        }
    }

    if registry.is_empty().await {
        return Err(StartupError::NoStations);
    }

    let app = create_router(AppState::new(registry.clone()));
    let listener = tokio::net::TcpListener::bind(settings.listen).await?;
    info!(addr = %settings.listen, stations = registry.len().await, "departure board listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.shutdown().await;
    info!("departure board stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
