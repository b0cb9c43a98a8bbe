//! Storefront API server.
//!
//! ```bash
//! APP_ENV=development DATABASE_URI=./storefront_dev.db SEED=true cargo run -p storefront-api
//! ```

use anyhow::Context;
use axum::extract::Request;
use axum::ServiceExt;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use storefront_api::config::AppConfig;
use storefront_api::state::AppState;
use storefront_api::{routes, server, telemetry};
use storefront_db::{seed, Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    telemetry::init_tracing(config.env);

    info!(env = %config.env, "Starting storefront API");

    let db = Database::new(
        DbConfig::new(&config.database_uri).max_connections(config.db_max_connections),
    )
    .await
    .context("Failed to open database")?;

    if config.should_seed() {
        let report = seed::seed(&db).await.context("Failed to seed database")?;
        info!(
            categories = report.categories,
            products = report.products,
            carts = report.carts,
            "Database seeded"
        );
    } else if config.seed {
        warn!("SEED is ignored outside development");
    }

    info!("Available routes:\n{}", routes::route_listing());

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(%address, "Listening");

    let app = server::app(AppState::new(db.clone(), config));
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
