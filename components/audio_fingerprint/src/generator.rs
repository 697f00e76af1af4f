use sha2::{Digest, Sha256};

use crate::types::{FingerprintDigest, FingerprintHash, DIGEST_LEN};

/// Samples per energy window
pub const CHUNK_SIZE: usize = 4096;

/// Upper bound on windows hashed, so long tracks cost the same as short ones
pub const MAX_CHUNKS: usize = 100;

/// Derive the fingerprint digest of a decoded stream.
///
/// The digest covers the loudness envelope of the first `MAX_CHUNKS` windows
/// followed by the stream layout (rate, channels, sample count). Coarse
/// energies survive lossy re-encoding of the same recording much better than
/// the raw samples do.
///
/// # Examples
/// ```
/// # use audio_fingerprint::generate_digest;
/// let samples = vec![1200i16; 4096 * 3];
/// let first = generate_digest(&samples, 44_100, 2);
/// let second = generate_digest(&samples, 44_100, 2);
/// assert_eq!(first, second);
/// ```
pub fn generate_digest(samples: &[i16], sample_rate: u32, channels: u16) -> FingerprintDigest {
    let chunk_count = (samples.len() / CHUNK_SIZE).min(MAX_CHUNKS);

    let mut hasher = Sha256::new();
    for chunk in samples.chunks_exact(CHUNK_SIZE).take(chunk_count) {
        hasher.update(chunk_energy(chunk).to_le_bytes());
    }
    hasher.update(sample_rate.to_le_bytes());
    hasher.update(u32::from(channels).to_le_bytes());
    // Wraps past u32::MAX samples, roughly 12 hours of 48kHz stereo
    hasher.update((samples.len() as u32).to_le_bytes());

    let digest: [u8; DIGEST_LEN] = hasher.finalize().into();
    FingerprintDigest {
        hash: FingerprintHash::from_digest(&digest),
        duration_seconds: duration_seconds(samples.len(), sample_rate, channels),
    }
}

/// Mean absolute amplitude of a window, truncated towards zero
fn chunk_energy(chunk: &[i16]) -> i32 {
    if chunk.is_empty() {
        return 0;
    }
    let total: i64 = chunk.iter().map(|&s| i64::from(s).abs()).sum();
    (total / chunk.len() as i64) as i32
}

/// Whole seconds of audio in an interleaved buffer.
///
/// `sample_count / (rate * channels)` in integer arithmetic. Dividing by the
/// rate and then by the channel count truncates to the same value.
pub(crate) fn duration_seconds(sample_count: usize, sample_rate: u32, channels: u16) -> u64 {
    let samples_per_second = u64::from(sample_rate) * u64::from(channels);
    (sample_count as u64)
        .checked_div(samples_per_second)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn envelope(levels: &[i16]) -> Vec<i16> {
        levels
            .iter()
            .flat_map(|&level| {
                (0..CHUNK_SIZE).map(move |i| if i % 2 == 0 { level } else { -level })
            })
            .collect()
    }

    fn expected_hash(energies: &[i32], sample_rate: u32, channels: u32, count: u32) -> String {
        let mut bytes = Vec::new();
        for energy in energies {
            bytes.extend_from_slice(&energy.to_le_bytes());
        }
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&channels.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        let digest: [u8; 32] = Sha256::digest(&bytes).into();
        FingerprintHash::from_digest(&digest).as_str().to_owned()
    }

    #[test]
    fn identical_input_gives_identical_hash() {
        let samples = envelope(&[100, 2000, 30000, 5]);
        let a = generate_digest(&samples, 48_000, 2);
        let b = generate_digest(&samples.clone(), 48_000, 2);
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn hash_covers_energies_then_layout() {
        let samples = envelope(&[100, 2000]);
        let digest = generate_digest(&samples, 44_100, 2);
        assert_eq!(
            digest.hash.as_str(),
            expected_hash(&[100, 2000], 44_100, 2, (2 * CHUNK_SIZE) as u32)
        );
    }

    #[test]
    fn trailing_partial_chunk_only_counts_towards_length() {
        let mut samples = envelope(&[640]);
        samples.extend(std::iter::repeat(i16::MAX).take(CHUNK_SIZE - 1));

        let digest = generate_digest(&samples, 22_050, 1);
        assert_eq!(
            digest.hash.as_str(),
            expected_hash(&[640], 22_050, 1, (2 * CHUNK_SIZE - 1) as u32)
        );
    }

    #[test]
    fn only_first_hundred_chunks_are_hashed() {
        let mut short = envelope(&vec![300; MAX_CHUNKS]);
        let mut long = short.clone();
        long.extend(envelope(&[9000, 9000]));
        short.extend(envelope(&[10, 10]));

        // Same length, same first 100 windows, different tail
        assert_eq!(
            generate_digest(&short, 44_100, 2).hash,
            generate_digest(&long, 44_100, 2).hash
        );
    }

    #[test]
    fn minimum_sample_does_not_overflow() {
        let samples = vec![i16::MIN; CHUNK_SIZE];
        let digest = generate_digest(&samples, 8_000, 1);
        assert_eq!(
            digest.hash.as_str(),
            expected_hash(&[32768], 8_000, 1, CHUNK_SIZE as u32)
        );
    }

    #[test]
    fn empty_stream_still_has_a_full_length_hash() {
        let digest = generate_digest(&[], 44_100, 2);
        assert!(digest.hash.is_current_version());
        assert_eq!(digest.duration_seconds, 0);
    }

    #[rstest]
    #[case::different_rate(44_100, 2, 48_000, 2)]
    #[case::different_channels(44_100, 2, 44_100, 1)]
    fn layout_changes_the_hash(
        #[case] rate_a: u32,
        #[case] channels_a: u16,
        #[case] rate_b: u32,
        #[case] channels_b: u16,
    ) {
        let samples = envelope(&[1000, 1000]);
        assert_ne!(
            generate_digest(&samples, rate_a, channels_a).hash,
            generate_digest(&samples, rate_b, channels_b).hash
        );
    }

    #[rstest]
    #[case::mono(44_100 * 10, 44_100, 1, 10)]
    #[case::stereo(44_100 * 2 * 10, 44_100, 2, 10)]
    #[case::stereo_partial_second(44_100 * 3 - 1, 44_100, 2, 1)]
    #[case::zero_rate(1000, 0, 2, 0)]
    #[case::zero_channels(1000, 44_100, 0, 0)]
    fn duration_is_truncated_seconds(
        #[case] count: usize,
        #[case] rate: u32,
        #[case] channels: u16,
        #[case] expected: u64,
    ) {
        assert_eq!(duration_seconds(count, rate, channels), expected);
    }
}
