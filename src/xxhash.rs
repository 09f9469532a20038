//! XXH32 wrapper used to fingerprint gauge keys.
//!
//! Backed by the `xxhash-rust` crate; only the 32-bit variant is needed.
//! Digests are routing fingerprints, not adversary-resistant hashes.

pub use xxhash_rust::xxh32::Xxh32 as Xxh32State;

/// Seed for every key fingerprint the writer computes.
pub const FINGERPRINT_SEED: u32 = 5132;

/// One-shot XXH32 over `data`.
#[inline]
pub fn xxh32_oneshot(data: &[u8], seed: u32) -> u32 {
    xxhash_rust::xxh32::xxh32(data, seed)
}

/// Fingerprint a `(namespace, key)` pair: XXH32 over the namespace's four
/// little-endian bytes followed by the key bytes and a trailing NUL (the
/// terminator the storage tier keeps with each key).
pub fn gauge_fingerprint(namespace: u32, key: &str) -> u32 {
    let mut state = Xxh32State::new(FINGERPRINT_SEED);
    state.update(&namespace.to_le_bytes());
    state.update(key.as_bytes());
    state.update(&[0]);
    state.digest()
}
