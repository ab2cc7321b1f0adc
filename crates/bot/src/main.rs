//! ChatCal - conversation triage host
//!
//! Reads newline-delimited JSON chat messages from stdin, triages them and
//! forwards debounced batches to the configured analyzer.

use std::time::Duration;

use anyhow::Context;
use chatcal_bot::{run_ingest, AppContext};
use chatcal_infra::config::ConfigSource;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so both config and RUST_LOG can come from it
    let dotenv = dotenvy::dotenv();

    let (config, source) =
        chatcal_infra::config::load_or_default().context("failed to load configuration")?;

    chatcal_infra::init_tracing(&config.logging).context("failed to initialise logging")?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) => tracing::debug!(error = %e, "No .env file loaded"),
    }
    match &source {
        ConfigSource::Environment => info!("Configuration loaded from environment variables"),
        ConfigSource::File(path) => info!(path = %path.display(), "Configuration loaded from file"),
        ConfigSource::Defaults => {
            warn!("No CHATCAL_WEBHOOK_URL or config file found, running with default configuration");
        }
    }

    let ctx = AppContext::new(config).await.context("failed to build application context")?;
    info!(
        batch_timeout_ms = ctx.config.triage.batch_timeout_ms,
        max_batch_size = ctx.config.triage.max_batch_size,
        "ChatCal started, reading messages from stdin"
    );

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            signal_token.cancel();
        }
    });

    let stats = run_ingest(BufReader::new(tokio::io::stdin()), &ctx.tracker, shutdown.clone())
        .await
        .context("ingest loop failed")?;
    info!(accepted = stats.accepted, rejected = stats.rejected, "Ingest finished");

    // On EOF give armed debounce timers one window to flush
    if !shutdown.is_cancelled() {
        let grace = ctx.config.triage.batch_timeout() + Duration::from_secs(1);
        tokio::select! {
            _ = shutdown.cancelled() => {}
            _ = tokio::time::sleep(grace) => {}
        }
    }

    let snapshot = ctx.shutdown().await.context("shutdown failed")?;
    info!(metrics = %serde_json::to_string(&snapshot)?, "Final batch metrics");

    Ok(())
}
