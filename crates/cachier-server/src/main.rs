//! # Cachier Server
//!
//! Main entry point: loads configuration, installs logging, opens the
//! shared MySQL and Redis connections and serves the REST API until
//! SIGINT or SIGTERM.

use cachier_config::ConfigLoader;
use cachier_core::telemetry::{init_basic_tracing, init_telemetry, shutdown_telemetry, TelemetryConfig};
use cachier_core::CachierResult;
use cachier_server::{app::App, startup};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Application error: {}", e);
        shutdown_telemetry();
        std::process::exit(1);
    }
    shutdown_telemetry();
}

async fn run() -> CachierResult<()> {
    let config_loader = match ConfigLoader::from_default_location() {
        Ok(loader) => loader,
        Err(e) => {
            // Config never loaded, so fall back to default log settings.
            let _ = init_basic_tracing(&TelemetryConfig::default());
            return Err(e);
        }
    };
    let config = config_loader.get();

    init_telemetry(&config.observability.telemetry(&config.app.name))?;

    startup::print_banner();
    info!("Starting Cachier Server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    let app = App::build(config).await?;

    startup::print_startup_info(config);
    app.serve(&config.server.rest_addr(), shutdown_signal()).await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
