//! ξ: the sliding window of already-accumulated work-package hashes. Always exactly
//! `epoch_length` blocks deep, so an entry leaves the window after exactly
//! `epoch_length` shifts; used to reject re-accumulating a package that has already
//! been paid out.

use std::collections::VecDeque;

use jam_primitives::hash::Hash;

/// ξ: one entry per recent block, each holding the package hashes it accumulated.
#[derive(Debug, Clone, Default)]
pub struct AccumulatedWindow {
    blocks: VecDeque<Vec<Hash>>,
}

impl AccumulatedWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a window already at its steady-state length of `epoch_length` empty
    /// entries, so genesis satisfies `|ξ(σ)| = epoch_length` from the first block.
    pub fn genesis(epoch_length: u32) -> Self {
        let mut blocks = VecDeque::with_capacity(epoch_length as usize);
        for _ in 0..epoch_length {
            blocks.push_back(Vec::new());
        }
        Self { blocks }
    }

    pub fn contains(&self, package_hash: &Hash) -> bool {
        self.blocks.iter().any(|block| block.contains(package_hash))
    }

    /// Shift in this block's newly accumulated package hashes, evicting the oldest
    /// entry so the window stays exactly `epoch_length` long.
    pub fn shift(&mut self, newly_accumulated: Vec<Hash>, epoch_length: u32) {
        self.blocks.push_back(newly_accumulated);
        while self.blocks.len() > epoch_length as usize {
            self.blocks.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &VecDeque<Vec<Hash>> {
        &self.blocks
    }
}
