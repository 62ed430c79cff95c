// Main entry point for the listing watcher

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watcher_core::engine::{PollCycleConfig, PollCycleEngine};
use watcher_core::kernel::WatcherDeps;
use watcher_core::Config;

#[derive(Parser, Debug)]
#[command(name = "watcher", about = "Announce new classifieds listings on Telegram")]
struct Args {
    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,watcher_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; any error here exits non-zero before polling starts
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        search_url = %config.search_url,
        interval_secs = config.check_interval.as_secs(),
        "Configuration loaded"
    );

    let (deps, telegram) = WatcherDeps::from_config(&config)
        .await
        .context("Failed to initialize dependencies")?;
    tracing::info!(database_url = %config.database_url, "Seen store opened");

    match telegram.get_me().await {
        Ok(bot) => tracing::info!(
            bot = %bot.username.as_deref().unwrap_or(&bot.first_name),
            "Telegram credentials verified"
        ),
        Err(e) => tracing::warn!(error = %e, "Telegram credentials check failed"),
    }

    let store = deps.store.clone();
    let mut engine = PollCycleEngine::new(deps, PollCycleConfig::from(&config));

    if args.once {
        let report = engine.run_cycle().await;
        tracing::info!(notified = report.notified, "Single cycle complete");
    } else {
        tokio::select! {
            _ = engine.run() => {}
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for shutdown signal")?;
                tracing::info!("Shutdown signal received");
            }
        }
    }

    store.close().await;
    tracing::info!("Seen store closed");

    Ok(())
}
