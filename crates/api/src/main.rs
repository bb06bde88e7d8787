use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use freelance_api::config::ServerConfig;
use freelance_api::router::build_app_router;
use freelance_api::state::AppState;
use freelance_core::latency::{FixedLatency, Latency, NoLatency};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "freelance_api=debug,freelance_core=debug,freelance_events=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(
        host = %config.host,
        port = %config.port,
        simulated_latency = config.simulated_latency,
        "Loaded server configuration"
    );

    // --- Simulated latency ---
    // Cancelled at shutdown so in-flight waits fail fast instead of holding
    // connections open.
    let latency_cancel = CancellationToken::new();
    let latency: Arc<dyn Latency> = if config.simulated_latency {
        Arc::new(FixedLatency::default().with_cancellation(latency_cancel.clone()))
    } else {
        Arc::new(NoLatency)
    };

    // --- App state ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let state = AppState::new(config, latency);

    // Spawn the activity journal (records every workflow event in memory).
    let journal_handle = tokio::spawn(Arc::clone(&state.journal).run(state.event_bus.subscribe()));
    tracing::info!("Activity journal started");

    let event_bus = Arc::clone(&state.event_bus);
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(latency_cancel))
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The router (and its state) is gone; dropping the last bus handle
    // closes the channel and lets the journal loop exit.
    drop(event_bus);
    if tokio::time::timeout(shutdown_timeout, journal_handle)
        .await
        .is_err()
    {
        tracing::warn!("Activity journal did not stop within the shutdown timeout");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). Pending simulated
/// delays are cancelled once a signal arrives.
async fn shutdown_signal(latency_cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }

    latency_cancel.cancel();
}
