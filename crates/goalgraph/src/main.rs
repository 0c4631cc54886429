//! Goalgraph CLI binary.

use anyhow::Result;
use goalgraph::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the goalgraph CLI.
///
/// Runs on tokio's current_thread runtime; every command is a short
/// sequence of file reads and writes.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=goalgraph=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("goalgraph=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting goalgraph CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Goalgraph CLI completed successfully");
    Ok(())
}
