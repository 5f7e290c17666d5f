//! Liveness endpoint for the hosting platform.
//!
//! Any GET answers a static readiness string. When a Prometheus handle is
//! given, `/metrics` serves the exposition instead.

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Body of every non-metrics response.
pub const READY_MESSAGE: &str = "Nairi Monitor Running.";

async fn ready() -> &'static str {
    READY_MESSAGE
}

async fn render_metrics(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

/// Build the health router.
pub fn router(metrics: Option<PrometheusHandle>) -> Router {
    let app = Router::new().route("/", get(ready)).fallback(ready);
    match metrics {
        Some(handle) => app.merge(
            Router::new()
                .route("/metrics", get(render_metrics))
                .with_state(handle),
        ),
        None => app,
    }
}

pub struct HealthServer {
    port: u16,
    metrics: Option<PrometheusHandle>,
}

impl HealthServer {
    pub fn new(port: u16, metrics: Option<PrometheusHandle>) -> Self {
        Self { port, metrics }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until `cancel` fires.
    ///
    /// # Errors
    /// Fails when the port cannot be bound.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let addr: SocketAddr = ([0, 0, 0, 0], self.port).into();
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(port = self.port, "Health server listening");

        axum::serve(listener, router(self.metrics))
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await?;

        tracing::info!("Health server stopped");
        Ok(())
    }
}
