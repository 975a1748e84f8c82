use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use momentumbot::{BinanceFuturesClient, Config, Orchestrator};
use tokio::sync::watch;

/// Leveraged futures momentum daemon: scans the USDT-M universe once
/// a minute, enters when short-horizon momentum and long-horizon RSI
/// agree, and supervises each position to its profit target.
#[derive(Parser)]
#[command(name = "momentumbot", version)]
struct Cli {
    /// Run a single scan tick and exit (open positions are still
    /// monitored to completion).
    #[arg(long)]
    once: bool,

    /// Load environment from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    setup_logging();

    let config = Arc::new(Config::from_env()?);
    tracing::info!("Momentum bot starting");
    tracing::info!("  Universe: {}-quoted, excluding {:?}", config.quote_asset, config.exclude_prefixes);
    tracing::info!(
        "  Signals: momentum {}% on {} / RSI 30-70 on {}",
        config.momentum_threshold_pct,
        config.short_interval,
        config.long_interval
    );
    tracing::info!(
        "  Sizing: {} per trade at {}x, profit target {}",
        config.investment_per_trade,
        config.leverage,
        config.profit_target
    );
    if config.use_testnet {
        tracing::info!("  Using Binance futures TESTNET");
    }

    let exchange = Arc::new(BinanceFuturesClient::new(
        config.api_key.clone(),
        config.api_secret.clone(),
        config.use_testnet,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let orchestrator = Arc::new(Orchestrator::new(exchange, config, shutdown_rx));

    if cli.once {
        orchestrator.run_tick().await;
        orchestrator.join_monitors().await;
        tracing::info!("Single tick complete");
        return Ok(());
    }

    let scan_task = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            orchestrator.run().await;
        })
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        result = scan_task => {
            tracing::error!("Scan loop exited unexpectedly: {:?}", result);
        }
    }

    // Monitors observe the shutdown signal at their next wait point
    // and log any position they leave open.
    let _ = shutdown_tx.send(true);
    orchestrator.join_monitors().await;

    tracing::info!("Momentum bot stopped");
    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "momentumbot=info".into()),
        )
        .init();
}
