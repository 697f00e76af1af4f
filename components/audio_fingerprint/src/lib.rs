//! Content fingerprints for detecting re-imports of the same recording.
//!
//! A fingerprint hashes the coarse loudness envelope of a decoded track, so
//! the same recording stored under another name, tag set or lossy encoding
//! lands close to the original. Stored fingerprints are compared bit by bit
//! to rank duplicate candidates.

mod decoder;
mod duplicates;
mod error;
mod generator;
mod similarity;
mod types;

pub use decoder::{AudioDecoder, SymphoniaDecoder};
pub use duplicates::{find_duplicates, DuplicateFinder, FingerprintCorpus, DEFAULT_SIMILARITY_THRESHOLD};
pub use error::FingerprintError;
pub use generator::{generate_digest, CHUNK_SIZE, MAX_CHUNKS};
pub use similarity::calculate_similarity;
pub use types::{
    AudioFingerprint, DecodedAudio, DuplicateMatch, FingerprintDigest, FingerprintHash, DIGEST_LEN,
};

use std::path::Path;
use std::sync::Arc;

/// Decodes files and fingerprints the result.
///
/// Any failure along the way is logged and reported as `None`: a file that
/// cannot be fingerprinted is simply left out of duplicate detection.
#[derive(Clone)]
pub struct Fingerprinter {
    decoder: Arc<dyn AudioDecoder>,
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self::new_with_decoder(Arc::new(SymphoniaDecoder::new()))
    }

    /// Create a fingerprinter with a specific decoder implementation
    pub fn new_with_decoder(decoder: Arc<dyn AudioDecoder>) -> Self {
        Self { decoder }
    }

    /// Decode and fingerprint on the current thread
    pub fn fingerprint_blocking(&self, path: &Path) -> Option<AudioFingerprint> {
        match self.decoder.decode(path) {
            Ok(audio) => {
                let digest = generate_digest(&audio.samples, audio.sample_rate, audio.channels);
                tracing::debug!(
                    path = %path.display(),
                    hash = %digest.hash,
                    duration_seconds = digest.duration_seconds,
                    "Generated fingerprint"
                );
                Some(AudioFingerprint::new(path, digest))
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not fingerprint audio file");
                None
            }
        }
    }

    /// Decode and fingerprint on tokio's blocking pool.
    ///
    /// The decode cannot be interrupted. Dropping the returned future leaves
    /// the blocking task running to completion; its result is discarded.
    pub async fn fingerprint(&self, path: impl AsRef<Path>) -> Option<AudioFingerprint> {
        let this = self.clone();
        let path = path.as_ref().to_path_buf();

        match tokio::task::spawn_blocking(move || this.fingerprint_blocking(&path)).await {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                tracing::error!(error = %e, "Fingerprint task failed");
                None
            }
        }
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Fingerprint a file with the default symphonia decoder
pub async fn generate_fingerprint(path: impl AsRef<Path>) -> Option<AudioFingerprint> {
    Fingerprinter::new().fingerprint(path).await
}
