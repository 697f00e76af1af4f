// bases/fingerprint_scanner/src/config.rs
use audio_fingerprint::DEFAULT_SIMILARITY_THRESHOLD;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;

const DEFAULT_JOBS: usize = 4;

/// Scanner configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the music library to scan
    pub library_path: PathBuf,

    /// Minimum similarity reported as a duplicate
    pub threshold: f64,

    /// JSON file holding fingerprints from earlier scans
    pub store_path: Option<PathBuf>,

    /// Files fingerprinted concurrently
    pub jobs: usize,

    pub verbose: bool,
}

/// Find re-imported recordings in a music library by audio fingerprint
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the music library root directory
    pub library_path: PathBuf,

    /// Minimum similarity (0.0 to 1.0) for two tracks to count as duplicates
    #[arg(short, long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    pub threshold: f64,

    /// Fingerprint store to compare against and update
    ///
    /// Created if it does not exist. Rescanned files replace their previous entry.
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// Number of files to decode at the same time
    #[arg(short, long, default_value_t = DEFAULT_JOBS)]
    pub jobs: usize,

    /// Log every fingerprint and decode failure
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Create configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        if !(0.0..=1.0).contains(&args.threshold) {
            return Err(eyre!(
                "Threshold must be between 0.0 and 1.0, got {}",
                args.threshold
            ));
        }
        if args.jobs == 0 {
            return Err(eyre!("At least one job is required"));
        }

        Ok(Self {
            library_path: args.library_path,
            threshold: args.threshold,
            store_path: args.store,
            jobs: args.jobs,
            verbose: args.verbose,
        })
    }

    /// Log filter used when RUST_LOG is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "fingerprint_scanner=debug,audio_fingerprint=debug"
        } else {
            "fingerprint_scanner=info,audio_fingerprint=warn"
        }
    }
}
