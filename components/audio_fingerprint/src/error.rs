use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("No audio stream in {0}")]
    NoAudioStream(PathBuf),

    #[error("Audio decoding error: {0}")]
    AudioDecode(String),

    #[error("Invalid fingerprint data")]
    InvalidFingerprint,
}
