//! pump-bundler - create a pump.fun token and bundle the first buys
//!
//! Publishes the token metadata, asks the PumpPortal `trade-local` API for
//! the create transaction plus one buy per wallet, signs everything locally
//! and prints the signed transactions as a JSON report.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pump_bundler::clients::{PumpIpfsPublisher, PumpPortalClient};
use pump_bundler::config::Config;
use pump_bundler::launch::{LaunchRequest, Orchestrator, RunStatus};
use pump_bundler::metrics::metrics;
use pump_bundler::types::{ImageUpload, SocialLinks, TokenMetadata};
use pump_bundler::wallet::KeypairStore;
use solana_sdk::signature::Signer;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", env = "PUMP_BUNDLER_CONFIG")]
    config: String,

    /// Token name
    #[arg(long)]
    name: String,

    /// Token symbol
    #[arg(long)]
    symbol: String,

    /// Token description
    #[arg(long, default_value = "")]
    description: String,

    /// Path to the token image
    #[arg(long)]
    image: String,

    #[arg(long)]
    twitter: Option<String>,

    #[arg(long)]
    telegram: Option<String>,

    #[arg(long)]
    website: Option<String>,

    /// Override the configured buy amount per wallet
    #[arg(long)]
    buy_amount: Option<f64>,

    /// Override the configured phase 1 batch size
    #[arg(long)]
    max_batch_size: Option<usize>,

    /// Write the JSON report to this file as well as stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print Prometheus metrics to stderr when done
    #[arg(long)]
    print_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::from_file_with_env(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;
    if let Some(amount) = args.buy_amount {
        config.launch.buy_amount = amount;
    }
    if let Some(size) = args.max_batch_size {
        config.launch.max_batch_size = size;
    }

    init_logging(&config, args.verbose)?;
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    config.validate().context("Invalid configuration")?;

    let store = KeypairStore::from_config(&config.wallet).context("Failed to load wallets")?;
    info!(
        creator = %store.creator().pubkey(),
        mint = %store.mint().pubkey(),
        buyers = store.buyers().len(),
        "Wallets loaded"
    );

    let image_bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read image {}", args.image))?;
    let file_name = std::path::Path::new(&args.image)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.png".to_string());

    let request = LaunchRequest {
        metadata: TokenMetadata {
            name: args.name,
            symbol: args.symbol,
            description: args.description,
            socials: SocialLinks {
                twitter: args.twitter,
                telegram: args.telegram,
                website: args.website,
            },
        },
        image: ImageUpload::new(file_name, ImageUpload::mime_for_path(&args.image), image_bytes),
        buy_amount: config.launch.buy_amount,
    };

    let orchestrator = Orchestrator::new(
        Arc::new(PumpPortalClient::from_config(&config.api)?),
        Arc::new(PumpIpfsPublisher::from_config(&config.api)?),
        config.launch.trade_params(),
        config.launch.max_batch_size,
    )?;

    let result = orchestrator.launch(&store, &request).await?;

    if let RunStatus::Failed { phase, error } = &result.status {
        warn!(
            phase = %phase,
            error = %error,
            signed = result.signed_count(),
            "Launch stopped early; returning what was signed"
        );
    }

    let report = serde_json::to_string_pretty(&result.report())?;
    println!("{}", report);
    if let Some(path) = &args.output {
        tokio::fs::write(path, &report)
            .await
            .with_context(|| format!("Failed to write report to {}", path))?;
    }

    if args.print_metrics {
        eprintln!("{}", metrics().render()?);
    }

    Ok(())
}

/// Initialize logging subsystem
fn init_logging(config: &Config, verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "pump_bundler=debug,info".to_string()
    } else {
        config.logging.filter.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so stdout carries only the JSON report
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}
