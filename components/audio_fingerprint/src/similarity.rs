use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Similarity of two stored fingerprint hashes, from 0.0 (every bit differs)
/// to 1.0 (identical).
///
/// Identical strings score 1.0 without being decoded. Hashes that are not
/// valid Base64, or that decode to digests of different lengths, score 0.0
/// and are logged; this never fails.
///
/// # Examples
/// ```
/// # use audio_fingerprint::calculate_similarity;
/// assert_eq!(calculate_similarity("AAAA", "AAAA"), 1.0);
/// assert_eq!(calculate_similarity("AAAA", "%%%%"), 0.0);
/// ```
pub fn calculate_similarity(hash_a: &str, hash_b: &str) -> f64 {
    if hash_a == hash_b {
        return 1.0;
    }

    let (bytes_a, bytes_b) = match (BASE64.decode(hash_a), BASE64.decode(hash_b)) {
        (Ok(a), Ok(b)) => (a, b),
        (a, b) => {
            tracing::warn!(
                first_valid = a.is_ok(),
                second_valid = b.is_ok(),
                "Fingerprint hash is not valid base64"
            );
            return 0.0;
        }
    };

    if bytes_a.len() != bytes_b.len() {
        tracing::warn!(
            first_len = bytes_a.len(),
            second_len = bytes_b.len(),
            "Fingerprint digests differ in length"
        );
        return 0.0;
    }

    let total_bits = bytes_a.len() * 8;
    if total_bits == 0 {
        return 0.0;
    }

    let differing_bits: u32 = bytes_a
        .iter()
        .zip(&bytes_b)
        .map(|(a, b)| (a ^ b).count_ones())
        .sum();

    1.0 - f64::from(differing_bits) / total_bits as f64
}
