use std::fs::File;
use std::io::{self, BufWriter, ErrorKind, Read, Seek, Write};
use std::path::{Path, PathBuf};

use symphonia::core::{
    audio::SampleBuffer,
    codecs::{DecoderOptions, CODEC_TYPE_NULL},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};
use tempfile::NamedTempFile;

use crate::error::FingerprintError;
use crate::types::DecodedAudio;

/// Turns an audio file into interleaved 16-bit PCM.
///
/// Decoding is blocking and not cancellable. Async callers should go through
/// [`crate::Fingerprinter::fingerprint`], which moves it off the runtime.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, FingerprintError>;
}

/// Decoder backed by symphonia's format readers and codecs.
///
/// Decoded PCM is spooled through a uniquely named temp file while the stream
/// is read. The file is removed when the call returns, whatever the outcome.
#[derive(Debug, Clone)]
pub struct SymphoniaDecoder {
    spool_dir: PathBuf,
}

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self::with_spool_dir(std::env::temp_dir())
    }

    pub fn with_spool_dir(spool_dir: impl Into<PathBuf>) -> Self {
        Self {
            spool_dir: spool_dir.into(),
        }
    }

    pub fn spool_dir(&self) -> &Path {
        &self.spool_dir
    }

    fn open(path: &Path) -> Result<File, FingerprintError> {
        File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FingerprintError::FileNotFound(path.to_path_buf()),
            _ => FingerprintError::Io(e),
        })
    }

    fn spool(&self) -> Result<NamedTempFile, FingerprintError> {
        let spool = tempfile::Builder::new()
            .prefix("fingerprint-")
            .suffix(".pcm")
            .tempfile_in(&self.spool_dir)?;
        Ok(spool)
    }
}

impl Default for SymphoniaDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, FingerprintError> {
        tracing::debug!("Decoding file: {:?}", path);
        let file = Self::open(path)?;
        let spool = self.spool()?;

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }

        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| FingerprintError::AudioDecode(e.to_string()))?;
        let mut format = probed.format;

        let track = format
            .default_track()
            .filter(|track| track.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| FingerprintError::NoAudioStream(path.to_path_buf()))?;
        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;
        let mut channels = track.codec_params.channels.map(|c| c.count() as u16);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| FingerprintError::AudioDecode(e.to_string()))?;

        let mut writer = BufWriter::new(spool);
        let mut sample_buf: Option<SampleBuffer<i16>> = None;
        let mut sample_count = 0usize;
        let mut decoded_packets = 0usize;
        let mut skipped_packets = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(e) => return Err(FingerprintError::AudioDecode(e.to_string())),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::debug!("Skipping corrupt packet in {:?}: {}", path, e);
                    skipped_packets += 1;
                    continue;
                }
                Err(e) => return Err(FingerprintError::AudioDecode(e.to_string())),
            };

            let spec = *decoded.spec();
            if decoded_packets == 0 {
                sample_rate = Some(spec.rate);
                channels = Some(spec.channels.count() as u16);
            }
            decoded_packets += 1;

            let needed = decoded.capacity() * spec.channels.count();
            if sample_buf.as_ref().is_some_and(|buf| buf.capacity() < needed) {
                sample_buf = None;
            }
            let buf = sample_buf
                .get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, spec));
            buf.copy_interleaved_ref(decoded);

            for sample in buf.samples() {
                writer.write_all(&sample.to_le_bytes())?;
            }
            sample_count += buf.samples().len();
        }

        if decoded_packets == 0 && skipped_packets > 0 {
            return Err(FingerprintError::AudioDecode(format!(
                "none of {} packets could be decoded",
                skipped_packets
            )));
        }

        let (sample_rate, channels) = match (sample_rate, channels) {
            (Some(rate), Some(channels)) if rate > 0 && channels > 0 => (rate, channels),
            _ => {
                return Err(FingerprintError::AudioDecode(
                    "stream does not declare sample rate and channel layout".into(),
                ))
            }
        };

        let mut spool = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        spool.rewind()?;
        let mut bytes = Vec::with_capacity(sample_count * 2);
        spool.read_to_end(&mut bytes)?;

        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        if skipped_packets > 0 {
            tracing::debug!("Skipped {} corrupt packets in {:?}", skipped_packets, path);
        }

        Ok(DecodedAudio {
            samples,
            sample_rate,
            channels,
        })
    }
}
