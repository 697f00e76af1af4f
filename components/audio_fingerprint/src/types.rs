use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Size in bytes of the digest behind every fingerprint this crate produces
pub const DIGEST_LEN: usize = 32;

/// Base64 text of a fingerprint digest, as stored next to a track
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerprintHash(String);

impl FingerprintHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub(crate) fn from_digest(digest: &[u8; DIGEST_LEN]) -> Self {
        Self(BASE64.encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::FingerprintError> {
        BASE64
            .decode(&self.0)
            .map_err(|_| crate::FingerprintError::InvalidFingerprint)
    }

    /// True when the hash decodes to a digest of the length this crate writes.
    /// Anything else came from another digest version or is corrupt.
    pub fn is_current_version(&self) -> bool {
        self.to_bytes()
            .map(|bytes| bytes.len() == DIGEST_LEN)
            .unwrap_or(false)
    }
}

impl fmt::Display for FingerprintHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FingerprintHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Hash and duration derived from decoded samples, before it is tied to a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintDigest {
    pub hash: FingerprintHash,
    pub duration_seconds: u64,
}

/// A content fingerprint computed from one audio file.
///
/// Values are immutable: when the source file changes a new fingerprint is
/// generated and replaces the old one wherever it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFingerprint {
    file_path: PathBuf,
    hash: FingerprintHash,
    duration_seconds: u64,
    generated_at: DateTime<Utc>,
}

impl AudioFingerprint {
    pub fn new(file_path: impl Into<PathBuf>, digest: FingerprintDigest) -> Self {
        Self::with_timestamp(file_path, digest, Utc::now())
    }

    pub fn with_timestamp(
        file_path: impl Into<PathBuf>,
        digest: FingerprintDigest,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            hash: digest.hash,
            duration_seconds: digest.duration_seconds,
            generated_at,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn hash(&self) -> &FingerprintHash {
        &self.hash
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

/// Interleaved 16-bit PCM for a whole stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    pub fn duration_seconds(&self) -> u64 {
        crate::generator::duration_seconds(self.samples.len(), self.sample_rate, self.channels)
    }
}

/// A corpus entry whose fingerprint is close enough to a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateMatch<T> {
    pub track_id: T,
    pub similarity: f64,
}
