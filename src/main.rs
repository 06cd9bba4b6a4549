//! FrameKV - A Minimal Length-Framed In-Memory Key-Value Store
//!
//! This is the main entry point for the FrameKV server.
//! It builds the worker pool, sets up the TCP listener and storage engine,
//! and serves connections until Ctrl+C.

use anyhow::Context;
use clap::Parser;
use framekv::server::Server;
use framekv::storage::StorageEngine;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Server configuration
#[derive(Debug, Parser)]
#[command(
    name = "framekv",
    version = framekv::VERSION,
    about = "FrameKV - A Minimal Length-Framed In-Memory Key-Value Store"
)]
struct Config {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = framekv::DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = framekv::DEFAULT_PORT)]
    port: u16,

    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Config {
    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn worker_threads(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

fn print_banner(config: &Config, workers: usize) {
    println!(
        r#"
FrameKV v{} - Minimal Length-Framed In-Memory Key-Value Store
──────────────────────────────────────────────────────────────
Server started on {} ({} worker threads)
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        framekv::VERSION,
        config.bind_address(),
        workers
    );
}

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::parse();

    // Set up logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .init();

    // Every worker runs the same scheduler loop; a connection task may be
    // polled by any of them.
    let workers = config.worker_threads();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .thread_name("framekv-worker")
        .enable_all()
        .build()
        .context("failed to build the worker pool")?;

    runtime.block_on(serve(config, workers))
}

async fn serve(config: Config, workers: usize) -> anyhow::Result<()> {
    // Create the storage engine (shared across all connections)
    let storage = Arc::new(StorageEngine::new());
    info!("Storage engine initialized with 64 shards");

    // Bind the TCP listener
    let server = Server::bind(config.bind_address(), storage)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!("Listening on {}", server.local_addr()?);

    // Print the banner
    print_banner(&config, workers);

    // Set up graceful shutdown
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    server.run_until(shutdown).await;

    info!("Server shutdown complete");
    Ok(())
}
