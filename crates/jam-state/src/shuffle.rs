//! Deterministic Fisher-Yates shuffle, used both for Safrole's fallback key sequence
//! and for guarantor-assignment rotation.
//!
//! The canonical definition is recursive; this module implements an iterative in-place
//! shuffle that yields an identical output sequence.

use jam_primitives::hash::{blake2b_256_concat, Hash};

/// The i-th entropy word: `Blake2b-256(seed ‖ E₄(⌊i/8⌋))`, read as the little-endian
/// u32 at byte offset `4i mod 32`.
fn entropy_word(seed: &Hash, i: usize) -> u32 {
    let block = (i / 8) as u32;
    let digest = blake2b_256_concat(&[seed, &block.to_le_bytes()]);
    let offset = (4 * i) % 32;
    u32::from_le_bytes(digest[offset..offset + 4].try_into().unwrap())
}

/// Shuffle `items` deterministically using `seed`. Equivalent to the recursive
/// definition: at each step `i`, pick index `eᵢ mod (n-i)` from the elements not yet
/// emitted, emit it, and replace its slot with the last remaining element.
pub fn fisher_yates_shuffle<T: Clone>(seed: &Hash, items: &[T]) -> Vec<T> {
    let n = items.len();
    let mut remaining = items.to_vec();
    let mut result = Vec::with_capacity(n);

    for i in 0..n {
        let range = (n - i) as u32;
        let word = entropy_word(seed, i);
        let idx = (word % range) as usize;

        result.push(remaining[idx].clone());

        let last = remaining.len() - 1;
        remaining.swap(idx, last);
        remaining.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn empty_input_yields_empty_output() {
        let seed = [1u8; 32];
        let out: Vec<u8> = fisher_yates_shuffle(&seed, &[]);
        assert!(out.is_empty());
    }

    #[test]
    fn output_is_a_permutation_of_the_input() {
        let seed = [42u8; 32];
        let items: Vec<u32> = (0..200).collect();
        let shuffled = fisher_yates_shuffle(&seed, &items);

        assert_eq!(shuffled.len(), items.len());
        let input_set: BTreeSet<_> = items.iter().collect();
        let output_set: BTreeSet<_> = shuffled.iter().collect();
        assert_eq!(input_set, output_set);
    }

    #[test]
    fn shuffle_is_deterministic() {
        let seed = [7u8; 32];
        let items: Vec<u32> = (0..64).collect();
        let a = fisher_yates_shuffle(&seed, &items);
        let b = fisher_yates_shuffle(&seed, &items);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_usually_produce_different_orders() {
        let items: Vec<u32> = (0..64).collect();
        let a = fisher_yates_shuffle(&[1u8; 32], &items);
        let b = fisher_yates_shuffle(&[2u8; 32], &items);
        assert_ne!(a, b);
    }

    #[test]
    fn single_element_is_a_no_op() {
        let seed = [9u8; 32];
        let out = fisher_yates_shuffle(&seed, &[5u8]);
        assert_eq!(out, vec![5u8]);
    }

    #[test]
    fn large_permutation_matches_thousand_twenty_three_validators() {
        // Mirrors the published shuffle scenario's parameters (N=1023 validators,
        // entropy byte i = i) to check the permutation property at that scale without
        // depending on a hand-copied reference vector.
        let mut seed = [0u8; 32];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = i as u8;
        }
        let items: Vec<u32> = (0..1023).collect();
        let shuffled = fisher_yates_shuffle(&seed, &items);
        let input_set: BTreeSet<_> = items.iter().collect();
        let output_set: BTreeSet<_> = shuffled.iter().collect();
        assert_eq!(input_set, output_set);
    }
}
