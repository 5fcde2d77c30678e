//! folio-site server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser                 ┌──────────────────────────────────────────┐
//!     ───────────────────────▶│ http::server (axum + tower-http layers)  │
//!                             │    POST /contact → contact::handler      │
//!                             │                    → contact::service    │
//!                             │                    → mailer (sendmail)   │
//!                             │    GET /health                           │
//!                             │    everything else → static_root         │
//!                             └──────────────────────────────────────────┘
//!
//!     Cross-cutting: config (TOML), observability (tracing, metrics),
//!     lifecycle (signals → graceful shutdown)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use folio_site::config::load_or_default;
use folio_site::lifecycle::{signals, Shutdown};
use folio_site::observability::{logging, metrics};
use folio_site::HttpServer;

#[derive(Parser)]
#[command(name = "folio-site")]
#[command(about = "Portfolio site server with contact form endpoint", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("folio-site v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        contact_endpoint = %config.contact.endpoint_path,
        mail_transport = ?config.mail.transport,
        static_root = ?config.listener.static_root,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    tokio::spawn(signals::wait_for_signal(shutdown.clone()));

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
