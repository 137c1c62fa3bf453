//! Webhook Relay API server entry point.

use std::error::Error;
use std::sync::Arc;

use relay_api::config::Settings;
use relay_api::metrics::HttpMetrics;
use relay_api::state::AppState;
use relay_api::{app, telemetry};
use relay_core::clock::SystemClock;
use relay_forwarder::HttpRelayForwarder;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_env()?;
    let tracer_provider = telemetry::init(&settings)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        relay_enabled = settings.target_url.is_some(),
        "starting webhook relay"
    );

    let event_store = relay_event_store::connect(&settings.database_url).await?;
    let forwarder = HttpRelayForwarder::with_defaults()?;
    let metrics = HttpMetrics::new()?;

    let app_state = AppState::new(
        Arc::new(SystemClock),
        event_store,
        Arc::new(forwarder),
        settings.target_url.clone(),
        Arc::new(metrics),
    );

    let listener = tokio::net::TcpListener::bind((settings.host.as_str(), settings.port)).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    telemetry::shutdown(tracer_provider);
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
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
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
