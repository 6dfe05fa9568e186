//! HTTP server setup.
//!
//! # Responsibilities
//! - Mount a `Router` as the service behind an axum app
//! - Wire transport-level layers (tracing, request timeout)
//! - Bind to a listener and serve until shutdown

use std::future::Future;
use std::time::Duration;

use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::routing::Router;

/// HTTP server serving a single route tree.
pub struct HttpServer {
    app: axum::Router,
    config: Config,
}

impl HttpServer {
    /// Create a server dispatching every request to `router`.
    pub fn new(router: Router, config: Config) -> Self {
        let app = Self::build_app(router, &config);
        Self { app, config }
    }

    #[allow(deprecated)]
    fn build_app(router: Router, config: &Config) -> axum::Router {
        axum::Router::new()
            .fallback_service(router)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Wait for Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
