use anyhow::Context;
use board_ranking::config::LogFormat;
use board_ranking::{Config, InMemoryPostStore, RankingService};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load config")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.service.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }

    info!(
        service = %config.service.service_name,
        algorithm = %config.ranking.algorithm,
        snapshot = %config.service.snapshot_path.display(),
        "Starting board ranking run"
    );

    let store = InMemoryPostStore::load(&config.service.snapshot_path)
        .await
        .with_context(|| {
            format!(
                "Failed to load snapshot from {}",
                config.service.snapshot_path.display()
            )
        })?;

    let service = RankingService::with_options(Arc::new(store), config.ranking.fetch_options());

    // Ctrl-C aborts the fetch phase
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            let _ = cancel_tx.send(true);
        }
    });

    let ranked = service
        .top(
            config.ranking.algorithm,
            chrono::Utc::now(),
            config.ranking.top_k,
            Some(cancel_rx),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "Ranking failed");
            e
        })?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for entry in &ranked {
        let line = serde_json::to_string(entry).context("Failed to encode ranked post")?;
        writeln!(out, "{}", line).context("Failed to write output")?;
    }

    Ok(())
}
