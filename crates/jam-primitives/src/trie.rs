//! Bit-partitioned Patricia trie over a 31-byte-keyed dictionary.
//!
//! The i-th bit of each key selects the left or right subtree. Leaves encode either an
//! embedded value (≤ 32 bytes) or a hash of the value; branches encode the pair of
//! child node hashes. Each node (leaf or branch) is a fixed 64-byte buffer hashed with
//! Blake2b-256 to produce its node hash; the root is the node hash of the whole
//! dictionary.

use crate::hash::{blake2b_256, Hash, ZERO_HASH};
use std::collections::BTreeMap;

/// A state component key: 31 bytes.
pub type Key31 = [u8; 31];

/// The key→value dictionary that a state component set encodes to.
pub type Dictionary = BTreeMap<Key31, Vec<u8>>;

const EMBEDDED_HEADER_MASK: u8 = 0x80;
const HASHED_HEADER: u8 = 0xC0;
const MAX_EMBEDDED_LEN: usize = 32;

fn get_bit(key: &Key31, bit_index: usize) -> bool {
    let byte = key[bit_index / 8];
    (byte >> (7 - (bit_index % 8))) & 1 == 1
}

fn encode_leaf(key: &Key31, value: &[u8]) -> [u8; 64] {
    let mut buf = [0u8; 64];
    if value.len() <= MAX_EMBEDDED_LEN {
        buf[0] = EMBEDDED_HEADER_MASK | (value.len() as u8);
        buf[1..32].copy_from_slice(key);
        buf[32..32 + value.len()].copy_from_slice(value);
    } else {
        buf[0] = HASHED_HEADER;
        buf[1..32].copy_from_slice(key);
        let digest = blake2b_256(value);
        buf[32..64].copy_from_slice(&digest);
    }
    buf
}

fn encode_branch(left: &Hash, right: &Hash) -> [u8; 64] {
    let mut buf = [0u8; 64];
    buf[0] = left[0] & 0x7f;
    buf[1..32].copy_from_slice(&left[1..32]);
    buf[32..64].copy_from_slice(right);
    buf
}

fn node_hash(node: &[u8; 64]) -> Hash {
    blake2b_256(node)
}

/// Compute the trie root of a dictionary. Order-independent: callers may build the
/// `Dictionary` in any insertion order since it is a `BTreeMap` keyed by the 31-byte key.
pub fn compute_root(dict: &Dictionary) -> Hash {
    let entries: Vec<(&Key31, &Vec<u8>)> = dict.iter().collect();
    build(&entries, 0)
}

fn build(entries: &[(&Key31, &Vec<u8>)], depth: usize) -> Hash {
    match entries.len() {
        0 => ZERO_HASH,
        1 => {
            let (key, value) = entries[0];
            node_hash(&encode_leaf(key, value))
        }
        _ => {
            debug_assert!(depth < 31 * 8, "duplicate keys reached trie leaf depth");
            let mut left = Vec::new();
            let mut right = Vec::new();
            for &(key, value) in entries {
                if get_bit(key, depth) {
                    right.push((key, value));
                } else {
                    left.push((key, value));
                }
            }
            let left_hash = build(&left, depth + 1);
            let right_hash = build(&right, depth + 1);
            node_hash(&encode_branch(&left_hash, &right_hash))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte0: u8) -> Key31 {
        let mut k = [0u8; 31];
        k[0] = byte0;
        k
    }

    #[test]
    fn empty_dictionary_is_zero_root() {
        let dict = Dictionary::new();
        assert_eq!(compute_root(&dict), ZERO_HASH);
    }

    #[test]
    fn single_entry_hashes_as_leaf() {
        let mut dict = Dictionary::new();
        dict.insert(key(1), vec![1, 2, 3]);
        let root = compute_root(&dict);
        let expected = node_hash(&encode_leaf(&key(1), &[1, 2, 3]));
        assert_eq!(root, expected);
    }

    #[test]
    fn root_is_independent_of_insertion_order() {
        let mut a = Dictionary::new();
        a.insert(key(1), vec![1]);
        a.insert(key(200), vec![2]);
        a.insert(key(42), vec![3]);

        let mut b = Dictionary::new();
        b.insert(key(42), vec![3]);
        b.insert(key(200), vec![2]);
        b.insert(key(1), vec![1]);

        assert_eq!(compute_root(&a), compute_root(&b));
    }

    #[test]
    fn differing_values_change_the_root() {
        let mut a = Dictionary::new();
        a.insert(key(1), vec![1]);
        let mut b = Dictionary::new();
        b.insert(key(1), vec![2]);
        assert_ne!(compute_root(&a), compute_root(&b));
    }

    #[test]
    fn long_value_is_hashed_not_embedded() {
        let mut dict = Dictionary::new();
        let long_value = vec![7u8; 64];
        dict.insert(key(5), long_value.clone());
        let root = compute_root(&dict);
        let expected = node_hash(&encode_leaf(&key(5), &long_value));
        assert_eq!(root, expected);
        assert_eq!(expected, {
            let digest = blake2b_256(&long_value);
            let mut buf = [0u8; 64];
            buf[0] = HASHED_HEADER;
            buf[1..32].copy_from_slice(&key(5));
            buf[32..64].copy_from_slice(&digest);
            node_hash(&buf)
        });
    }
}
