//! Warden entry point
//!
//! Run with:
//! ```bash
//! cargo run -p warden-bot
//! ```
//!
//! Configuration is read from environment variables and `.env`.

use tracing::{error, info};
use warden_common::{try_init_tracing_with_config, AppConfig, TracingConfig};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Warden stopped with an error");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        "Configuration loaded"
    );

    warden_bot::run(config).await?;

    Ok(())
}
