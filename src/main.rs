//! emberkv - A Minimal In-Memory Key-Value Store
//!
//! This is the main entry point for the emberkv server.
//! It parses the port argument, sets up the storage engine, and runs the
//! accept loop until interrupted.

use emberkv::connection::{serve, ConnectionStats, MAX_CLIENTS};
use emberkv::storage::StorageEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
struct Config {
    /// Port to listen on
    port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: emberkv::DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Parses configuration from command-line arguments.
    ///
    /// A single positional argument selects the port. A malformed value
    /// gets a diagnostic and falls back to the default; startup proceeds
    /// either way.
    fn from_args() -> Self {
        let mut config = Config::default();

        if let Some(raw) = std::env::args().nth(1) {
            match raw.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => {
                    eprintln!(
                        "Invalid port number '{}'. Using default {}",
                        raw,
                        emberkv::DEFAULT_PORT
                    );
                }
            }
        }

        config
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", emberkv::DEFAULT_HOST, self.port)
    }
}

fn print_banner(config: &Config) {
    println!(
        r#"
emberkv v{} - In-Memory Key-Value Store
───────────────────────────────────────
Server started on {}
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        emberkv::VERSION,
        config.bind_address()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    print_banner(&config);

    // Create the storage engine (shared across all connections)
    let storage = Arc::new(StorageEngine::new());
    info!("Storage engine initialized");

    // Create connection statistics
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener; this is the only fatal failure path
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", config.bind_address());

    // Set up graceful shutdown
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received, stopping server...");
    };

    // Main accept loop
    tokio::select! {
        _ = serve(listener, storage, stats, MAX_CLIENTS) => {}
        _ = shutdown => {}
    }

    info!("Server shutdown complete");
    Ok(())
}
