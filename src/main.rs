//! Launch Bundler
//!
//! Bundled token launch and exit orchestration for Solana.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use launch_bundler::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (JITO_API_TOKEN and RPC overrides go here)
    dotenvy::dotenv().ok();

    let app = cli::init();
    init_logging(app.verbose, app.debug)?;

    cli::execute(app).await
}

/// RUST_LOG wins when set; otherwise the flags pick the level
fn init_logging(verbose: bool, debug: bool) -> Result<()> {
    let fallback = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt().with_env_filter(filter).with_target(false).init();
    Ok(())
}
