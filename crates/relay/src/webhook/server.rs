use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

use crate::config::RelayConfig;

use super::{
    auth::require_basic_auth,
    handlers::{handle_webhook, health_check},
    state::AppState,
};

/// Path TTN posts uplinks to
pub const WEBHOOK_PATH: &str = "/webhook";

/// Request body size limit (1MB)
pub const MAX_REQUEST_SIZE: usize = 1024 * 1024;

/// Start the webhook server and run until Ctrl-C or SIGTERM
pub async fn start_webhook_server(config: RelayConfig) -> eyre::Result<()> {
    let addr = config.listen_addr;
    let app_state = AppState::new(Arc::new(config))?;

    info!(
        target_url = %app_state.osmand.positions_url(),
        "Forwarding uplinks to Traccar"
    );

    let app = create_router(app_state);

    let listener = TcpListener::bind(addr).await?;
    info!("Webhook server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Layers added last run first: credentials are checked before the body limit
    let webhook = post(handle_webhook)
        .route_layer(RequestBodyLimitLayer::new(MAX_REQUEST_SIZE))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_basic_auth));

    Router::new()
        .route(WEBHOOK_PATH, webhook)
        .route("/health", get(health_check))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Received shutdown signal, stopping gracefully...");
}
