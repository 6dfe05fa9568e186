//! scoped-mux demo server.
//!
//! ```text
//! CLI args → config (TOML, validated) → logging
//!     → app::build_router (route tree, middleware scopes)
//!     → HttpServer (axum + tower-http) → serve until Ctrl+C
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use scoped_mux::config::{load_config, Config};
use scoped_mux::{app, observability, HttpServer};

#[derive(Parser)]
#[command(name = "scoped-mux")]
#[command(about = "HTTP router with scoped middleware composition", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    observability::init(&config.logging)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        admin_enabled = config.auth.api_token.is_some(),
        "Configuration loaded"
    );

    let router = app::build_router(&config);
    for route in router.routes() {
        tracing::debug!(route = %route, "Route");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(router, config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
