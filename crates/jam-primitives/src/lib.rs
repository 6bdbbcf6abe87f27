//! Hashing, Merkle Mountain Range, and bit-partitioned trie primitives shared by every
//! layer of the JAM state transition function.

pub mod error;
pub mod hash;
pub mod keys;
pub mod mmr;
pub mod trie;

pub use error::{PrimitivesError, Result};
pub use hash::{blake2b_256, blake2b_256_concat, update_entropy, Hash, ZERO_HASH};
pub use mmr::Mmr;
pub use trie::{compute_root as trie_root, Dictionary, Key31};
