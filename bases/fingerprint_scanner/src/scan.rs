// bases/fingerprint_scanner/src/scan.rs
use audio_fingerprint::{find_duplicates, DuplicateMatch, FingerprintCorpus, Fingerprinter};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::store::FingerprintStore;

const AUDIO_EXTENSIONS: &[&str] = &[
    "flac", "mp3", "wav", "ogg", "m4a", "aac", "mp4", "mkv", "webm", "aiff", "aif", "caf",
];

/// A scanned file and the earlier tracks it appears to duplicate
#[derive(Debug)]
pub struct DuplicateReport {
    pub path: PathBuf,
    pub matches: Vec<DuplicateMatch<PathBuf>>,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub scanned: usize,
    pub fingerprinted: usize,
    pub failed: Vec<PathBuf>,
    pub duplicates: Vec<DuplicateReport>,
}

impl ScanReport {
    pub fn print_summary(&self) {
        if !self.duplicates.is_empty() {
            println!("\nPossible duplicates:");
            for report in &self.duplicates {
                println!("  {}", report.path.display());
                for m in &report.matches {
                    println!(
                        "    {:>6.2}%  {}",
                        m.similarity * 100.0,
                        m.track_id.display()
                    );
                }
            }
        }

        println!("\n{}", "=".repeat(60));
        println!("SCAN COMPLETE");
        println!("{}", "=".repeat(60));
        println!("  Audio files found:      {}", self.scanned);
        println!("  Fingerprinted:          {}", self.fingerprinted);
        println!("  Could not fingerprint:  {}", self.failed.len());
        println!("  Files with duplicates:  {}", self.duplicates.len());

        if !self.failed.is_empty() {
            println!("\nSkipped files:");
            for path in &self.failed {
                println!("  {}", path.display());
            }
        }
    }
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Audio files under `root`, sorted by path
pub fn discover_audio_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_audio_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Fingerprint every audio file in the library and check each one against
/// the store, which also collects the files already processed in this run.
pub async fn run(config: &Config, fingerprinter: &Fingerprinter, store: &mut FingerprintStore) -> ScanReport {
    let files = discover_audio_files(&config.library_path);
    tracing::info!(
        "Fingerprinting {} files from {}",
        files.len(),
        config.library_path.display()
    );

    if store.is_empty() {
        tracing::debug!("No stored fingerprints, comparing files within this scan only");
    }

    let mut report = ScanReport {
        scanned: files.len(),
        ..Default::default()
    };

    let mut results = stream::iter(files)
        .map(|path| async move {
            let fingerprint = fingerprinter.fingerprint(&path).await;
            (path, fingerprint)
        })
        .buffered(config.jobs);

    while let Some((path, fingerprint)) = results.next().await {
        let Some(fingerprint) = fingerprint else {
            report.failed.push(path);
            continue;
        };
        report.fingerprinted += 1;

        if let Some(previous) = store.get(&path) {
            if previous.hash() == fingerprint.hash() {
                tracing::debug!(
                    "{} unchanged since {}",
                    path.display(),
                    previous.generated_at()
                );
            }
        }

        let corpus = store
            .snapshot()
            .into_iter()
            .filter(|(track, _)| track != &path);
        let matches = find_duplicates(fingerprint.hash().as_str(), corpus, config.threshold);

        if !matches.is_empty() {
            tracing::debug!("{} matches {} stored tracks", path.display(), matches.len());
            report.duplicates.push(DuplicateReport {
                path: path.clone(),
                matches,
            });
        }

        store.replace(fingerprint);
    }

    report
}
