//! Merkle Mountain Range: an append-only structure mapping leaves to a bounded
//! sequence of optional peak hashes.

use crate::hash::{blake2b_256_concat, Hash, ZERO_HASH};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Append-only Merkle Mountain Range over 32-byte leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Mmr {
    /// `peaks[i]` is `Some(hash)` if the i-th slot (covering `2^i` leaves) is occupied.
    peaks: Vec<Option<Hash>>,
}

impl Mmr {
    /// An empty range.
    pub fn new() -> Self {
        Self { peaks: Vec::new() }
    }

    /// Reconstruct from a previously-serialized peak list (for snapshot loading).
    pub fn from_peaks(peaks: Vec<Option<Hash>>) -> Self {
        Self { peaks }
    }

    /// The raw peak list.
    pub fn peaks(&self) -> &[Option<Hash>] {
        &self.peaks
    }

    /// If slot `n` is empty, place the incoming hash there and stop; otherwise hash
    /// `H(existing ‖ incoming)`, clear slot `n`, and recurse into slot `n+1`.
    pub fn append(&mut self, leaf: Hash) {
        let mut incoming = leaf;
        let mut n = 0usize;
        loop {
            if n == self.peaks.len() {
                self.peaks.push(Some(incoming));
                return;
            }
            match self.peaks[n].take() {
                None => {
                    self.peaks[n] = Some(incoming);
                    return;
                }
                Some(existing) => {
                    incoming = blake2b_256_concat(&[&existing, &incoming]);
                    n += 1;
                }
            }
        }
    }

    /// Super-peak: fold the present peaks right-to-left with `H("node" ‖ acc ‖ next)`.
    /// An empty range yields the zero hash; a single peak returns itself.
    pub fn super_peak(&self) -> Hash {
        let mut acc: Option<Hash> = None;
        for slot in self.peaks.iter().rev() {
            let Some(peak) = slot else { continue };
            acc = Some(match acc {
                None => *peak,
                Some(prev) => blake2b_256_concat(&[b"node", peak, &prev]),
            });
        }
        acc.unwrap_or(ZERO_HASH)
    }
}
