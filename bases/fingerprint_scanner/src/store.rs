// bases/fingerprint_scanner/src/store.rs
use audio_fingerprint::{AudioFingerprint, FingerprintCorpus};
use color_eyre::{eyre::WrapErr, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fingerprints keyed by file path, persisted as JSON between scans
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FingerprintStore {
    fingerprints: Vec<AudioFingerprint>,
}

impl FingerprintStore {
    /// Load a store, treating a missing file as empty
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("No fingerprint store at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read fingerprint store {}", path.display()))?;
        let store: Self = serde_json::from_str(&contents)
            .wrap_err_with(|| format!("Corrupt fingerprint store {}", path.display()))?;

        tracing::info!("Loaded {} fingerprints from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .wrap_err_with(|| format!("Failed to write fingerprint store {}", path.display()))?;
        Ok(())
    }

    /// Store a fingerprint, returning the one it replaces for the same file
    pub fn replace(&mut self, fingerprint: AudioFingerprint) -> Option<AudioFingerprint> {
        match self
            .fingerprints
            .iter_mut()
            .find(|existing| existing.file_path() == fingerprint.file_path())
        {
            Some(existing) => Some(std::mem::replace(existing, fingerprint)),
            None => {
                self.fingerprints.push(fingerprint);
                None
            }
        }
    }

    pub fn get(&self, path: &Path) -> Option<&AudioFingerprint> {
        self.fingerprints.iter().find(|f| f.file_path() == path)
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}

impl FingerprintCorpus for FingerprintStore {
    type TrackId = PathBuf;

    fn snapshot(&self) -> Vec<(PathBuf, String)> {
        self.fingerprints
            .iter()
            .map(|f| (f.file_path().to_path_buf(), f.hash().to_string()))
            .collect()
    }
}
