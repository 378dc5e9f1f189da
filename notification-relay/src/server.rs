use std::time::Duration;

use datadog_tracing::axum::{OtelAxumLayer, OtelInResponseLayer};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::routes;
use crate::state::AppState;
use crate::types::Environment;

/// Overall deadline for one request, Slack delivery included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(25);

/// Builds the router with tracing and timeout layers
pub fn router(state: AppState) -> axum::Router {
    routes::handler()
        .with_state(state)
        // Include trace context as header into the response
        .layer(OtelInResponseLayer)
        // Start OpenTelemetry trace on incoming request
        .layer(OtelAxumLayer::default())
        .layer(tower_http::timeout::TimeoutLayer::new(REQUEST_TIMEOUT))
}

/// Starts the server with the given environment and state
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: &Environment,
    state: AppState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], environment.port()?));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Notification relay started on http://{addr}");

    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(anyhow::Error::from)
}
