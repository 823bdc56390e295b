//! ScanMarket - receipt auto-capture and extraction pipeline
//!
//! Turns a receipt image into a structured list of purchasable item names
//! and resolves each against the product catalog. Live camera sources plug
//! in behind the same capture controller that drives the file path used
//! here.

mod analysis;
mod capture;
mod catalog;
mod config;
mod error;
mod shared;
mod vision;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::capture::frame::StillStream;
use crate::capture::{CaptureController, ScanOutcome};
use crate::catalog::CatalogClient;
use crate::config::AppConfig;
use crate::shared::{ScanCommand, ScanEvent};
use crate::vision::RecognitionClient;

/// ScanMarket - receipt scanning pipeline
#[derive(Parser, Debug)]
#[command(name = "scanmarket")]
#[command(about = "Extract purchasable items from a receipt image and look them up in the product catalog")]
struct Args {
    /// Path to a receipt image to scan
    image: PathBuf,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the catalog lookup and only print extracted items
    #[arg(long)]
    no_resolve: bool,

    /// OCR language hint (overrides the configured value)
    #[arg(long)]
    language: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = load_or_create_config(args.config.as_deref())?;
    config.apply_env_overrides();
    if let Some(language) = args.language {
        config.recognition.language = language;
    }
    if config.recognition.api_key.is_empty() {
        anyhow::bail!(
            "no OCR API key configured; set recognition.api_key or the {} environment variable",
            config::API_KEY_ENV
        );
    }

    info!("ScanMarket starting");

    let stream = StillStream::from_path(&args.image)
        .with_context(|| format!("Failed to load image {:?}", args.image))?;
    let recognition = RecognitionClient::new(config.recognition.clone())?;

    let (command_tx, command_rx) = mpsc::channel(8);
    let (event_tx, mut event_rx) = mpsc::channel(64);
    let cancel = CancellationToken::new();

    let controller = CaptureController::new(
        Box::new(stream),
        recognition,
        &config,
        command_rx,
        event_tx,
        cancel.clone(),
    );

    // A still image has no live preview to wait for; capture it right away,
    // the way the original scanner's explicit capture action did.
    command_tx
        .send(ScanCommand::Capture)
        .await
        .context("capture controller is not running")?;

    let scan = tokio::spawn(controller.run());

    while let Some(event) = event_rx.recv().await {
        match event {
            ScanEvent::StateChanged(state) if state.is_terminal() => {
                info!(?state, "scan finished")
            }
            ScanEvent::StateChanged(state) => info!(?state, "scan state"),
            ScanEvent::RecognitionOutcome { is_receipt, error, .. } => {
                info!(is_receipt, ?error, "recognition outcome");
            }
            ScanEvent::SessionFailed { error } => warn!(%error, "scan failed"),
            _ => {}
        }
    }

    let outcome = scan.await.context("scan task panicked")??;

    let items = match outcome {
        ScanOutcome::Completed { items } => items,
        ScanOutcome::Cancelled => {
            warn!("scan cancelled before completion");
            return Ok(());
        }
    };

    println!("Detected items:");
    for item in &items {
        println!("  {item}");
    }

    if args.no_resolve {
        return Ok(());
    }

    let catalog = CatalogClient::new(config.catalog.clone())?;
    let records = catalog.resolve_items(&items).await;

    println!();
    for record in &records {
        println!("{}", record.name);
        println!("  Brand: {}", record.brand.as_deref().unwrap_or("-"));
        println!("  Category: {}", record.category.as_deref().unwrap_or("-"));
        match record.energy_per_100g {
            Some(energy) => println!("  Energy: {energy} kcal/100g"),
            None => println!("  Energy: -"),
        }
        println!("  Barcode: {}", record.barcode.as_deref().unwrap_or("-"));
        if !record.resolved {
            println!("  (no catalog match)");
        }
    }

    info!("ScanMarket done");

    Ok(())
}

/// Load configuration from an explicit path, the default location, or fall
/// back to defaults
fn load_or_create_config(path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = path {
        return config::load_config(path)
            .with_context(|| format!("Failed to load config from {path:?}"));
    }

    if let Ok(config_dir) = config::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                info!("Loaded configuration from {:?}", config_path);
                return Ok(config);
            }
        }
    }

    info!("Using default configuration");
    Ok(AppConfig::default())
}
