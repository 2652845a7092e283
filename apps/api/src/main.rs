use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;
mod state;

use shared_config::AppConfig;
use state::AppServices;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting StixConnect API server");

    let config = AppConfig::from_env();
    let port = config.server_port;
    let services = AppServices::build(config);

    // Escalation worker runs for the life of the server
    let worker = Arc::clone(&services.escalation);
    let worker_handle = tokio::spawn(async move {
        if let Err(e) = worker.start().await {
            error!("Escalation worker failed: {}", e);
        }
    });

    let mut alerts = services.escalation.notifier().subscribe();
    tokio::spawn(async move {
        loop {
            match alerts.recv().await {
                Ok(alert) => warn!("Escalation alert: {}", alert),
                Err(RecvError::Lagged(skipped)) => warn!("Alert log lagged, {} alerts skipped", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(&services)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    services.escalation.shutdown().await;
    if let Err(e) = worker_handle.await {
        error!("Escalation worker task panicked: {}", e);
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
