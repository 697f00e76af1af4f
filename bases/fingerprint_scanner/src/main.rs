// bases/fingerprint_scanner/src/main.rs
use audio_fingerprint::Fingerprinter;
use clap::Parser;
use color_eyre::Result;

mod config;
mod scan;
mod store;

use config::{CliArgs, Config};
use store::FingerprintStore;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::from_args(CliArgs::parse())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .init();

    if !config.library_path.exists() {
        return Err(color_eyre::eyre::eyre!(
            "Library path does not exist: {}",
            config.library_path.display()
        ));
    }

    let mut store = match &config.store_path {
        Some(path) => FingerprintStore::load(path)?,
        None => FingerprintStore::default(),
    };

    println!("Scanning music library: {}", config.library_path.display());
    println!("{}", "-".repeat(60));

    let report = scan::run(&config, &Fingerprinter::new(), &mut store).await;
    report.print_summary();

    if let Some(path) = &config.store_path {
        store.save(path)?;
        tracing::info!("Saved {} fingerprints to {}", store.len(), path.display());
    }

    Ok(())
}
