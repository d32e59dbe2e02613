//! Query fingerprints.
//!
//! A fingerprint is the BLAKE3 hash of the lowercase, trimmed query. It keys the embedding
//! memo and the single-flight table, so two spellings that only differ in case or
//! surrounding whitespace share both.

/// Lowercases and trims a query (the canonical form used for fingerprints).
#[inline]
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Returns the 32-byte fingerprint of a query.
#[inline]
pub fn query_fingerprint(query: &str) -> [u8; 32] {
    *blake3::hash(normalize_query(query).as_bytes()).as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Only used for bucketing (stub embedding features); collisions cost accuracy, never
/// correctness.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

/// Hex-encodes the first 8 bytes of a fingerprint (for log fields).
pub fn short_hex(fingerprint: &[u8; 32]) -> String {
    fingerprint[..8].iter().map(|b| format!("{:02x}", b)).collect()
}
