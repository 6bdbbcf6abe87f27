//! Blake2b-256 hashing.
//!
//! Every hash in the state transition function is a 32-byte Blake2b-256 digest:
//! header hashes, state roots, trie node hashes, MMR peaks, entropy accumulation.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

/// 32-byte opaque hash.
pub type Hash = [u8; 32];

/// Blake2b with a 32-byte digest.
type Blake2b256 = Blake2b<U32>;

/// Hash an arbitrary byte string with Blake2b-256.
pub fn blake2b_256(data: &[u8]) -> Hash {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash the concatenation of several byte slices without an intermediate allocation.
pub fn blake2b_256_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// `H(η₀ ‖ headerHash)` — the per-block entropy step.
///
/// Pure function of its two arguments: no implicit state.
pub fn update_entropy(eta0: &Hash, header_hash: &Hash) -> Hash {
    blake2b_256_concat(&[eta0, header_hash])
}

/// The all-zero hash, used as the MMR super-peak of an empty range.
pub const ZERO_HASH: Hash = [0u8; 32];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = blake2b_256(b"jam");
        let b = blake2b_256(b"jam");
        assert_eq!(a, b);
    }

    #[test]
    fn concat_matches_manual_concat() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"left");
        buf.extend_from_slice(b"right");
        assert_eq!(blake2b_256(&buf), blake2b_256_concat(&[b"left", b"right"]));
    }

    #[test]
    fn entropy_step_is_pure() {
        let eta0 = [1u8; 32];
        let header = [2u8; 32];
        let a = update_entropy(&eta0, &header);
        let b = update_entropy(&eta0, &header);
        assert_eq!(a, b);
        assert_ne!(a, eta0);
    }
}
