//! FrameKV command-line client.
//!
//! ```text
//! framekv-cli set name Ariz
//! [OK] : Operation completed.
//! framekv-cli get name
//! Ariz
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use framekv::client::Client;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "framekv-cli",
    version = framekv::VERSION,
    about = "Send a single request to a FrameKV server"
)]
struct Cli {
    /// Server host
    #[arg(short = 'H', long, default_value = framekv::DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = framekv::DEFAULT_PORT)]
    port: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read the value stored under a key
    Get { key: String },
    /// Store a value under a key
    Set { key: String, value: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let addr = format!("{}:{}", cli.host, cli.port);
    let client = Client::new(addr.clone());

    let response = match cli.command {
        Command::Get { key } => client.get(key).await,
        Command::Set { key, value } => client.set(key, value).await,
    }
    .with_context(|| format!("request to {} failed", addr))?;

    println!("{}", response);
    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}
