//! Deterministic byte-split schedules used to exercise [`ottd_net::Framer`]
//! and [`ottd_net::Session`] under arbitrary delivery boundaries.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Split `bytes` into a deterministic sequence of non-empty chunks whose
/// boundaries are chosen by a `seed`-derived RNG. Re-running with the same
/// `seed` and `bytes` always yields the same schedule.
#[must_use]
pub fn split_deterministically(bytes: &[u8], seed: u64) -> Vec<Vec<u8>> {
    if bytes.is_empty() {
        return Vec::new();
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut chunks = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let remaining = bytes.len() - offset;
        let take = rng.gen_range(1..=remaining);
        chunks.push(bytes[offset..offset + take].to_vec());
        offset += take;
    }

    chunks
}

/// Split `bytes` into one chunk per byte, the most adversarial delivery
/// schedule a stream transport can produce.
#[must_use]
pub fn split_byte_by_byte(bytes: &[u8]) -> Vec<Vec<u8>> {
    bytes.iter().map(|b| vec![*b]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_split_reassembles_to_the_original() {
        let bytes = b"the quick brown fox".to_vec();
        let chunks = split_deterministically(&bytes, 7);
        let reassembled: Vec<u8> = chunks.into_iter().flatten().collect();
        assert_eq!(reassembled, bytes);
    }

    #[test]
    fn same_seed_yields_same_schedule() {
        let bytes = b"repeatable".to_vec();
        assert_eq!(split_deterministically(&bytes, 42), split_deterministically(&bytes, 42));
    }

    #[test]
    fn byte_by_byte_yields_one_chunk_per_byte() {
        let bytes = b"abc".to_vec();
        assert_eq!(split_byte_by_byte(&bytes), vec![vec![b'a'], vec![b'b'], vec![b'c']]);
    }
}
