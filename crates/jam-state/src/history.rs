//! Recent block history (β): a short window of past blocks used to reject duplicate
//! work-package submissions, resolve dependency and segment-root lookups, and build
//! the state-root chain.

use std::collections::BTreeMap;
use std::collections::VecDeque;

use jam_primitives::hash::Hash;
use jam_primitives::mmr::Mmr;

use crate::error::{Result, StfError};
use crate::reports::WorkReport;

/// One entry of recent history: the block's header hash, the Merkle Mountain Range
/// accumulating every work-report hash seen so far, the work-package hashes reported
/// in that block, their segment roots, and its posterior state root.
///
/// The state root is filled in one block late: at the time block N is processed its
/// own posterior root is not yet known to the chain, so entry N's `state_root` stays
/// `None` until block N+1 is imported and [`RecentHistory::set_prior_state_root`] is
/// called.
#[derive(Debug, Clone)]
pub struct HistoryItem {
    pub header_hash: Hash,
    pub state_root: Option<Hash>,
    pub mmr: Mmr,
    pub work_package_hashes: Vec<Hash>,
    pub segment_roots: BTreeMap<Hash, Hash>,
}

/// β: a bounded FIFO of recent [`HistoryItem`]s, oldest-first.
#[derive(Debug, Clone, Default)]
pub struct RecentHistory {
    items: VecDeque<HistoryItem>,
}

impl RecentHistory {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn items(&self) -> &VecDeque<HistoryItem> {
        &self.items
    }

    /// Reject a work package whose hash is already present anywhere in the retained
    /// window.
    pub fn check_not_duplicate(&self, package_hash: &Hash) -> Result<()> {
        for item in &self.items {
            if item.work_package_hashes.contains(package_hash) {
                return Err(StfError::DuplicatePackage);
            }
        }
        Ok(())
    }

    /// Resolve `package_hash`'s segment root against the retained history window.
    pub fn resolve_segment_root(&self, package_hash: &Hash) -> Option<Hash> {
        self.items.iter().find_map(|item| item.segment_roots.get(package_hash).copied())
    }

    /// Fill in the previous entry's state root, now that it is known.
    pub fn set_prior_state_root(&mut self, root: Hash) {
        if let Some(last) = self.items.back_mut() {
            last.state_root = Some(root);
        }
    }

    /// Append a new entry, evicting the oldest if the window would exceed `max_len`.
    pub fn push(&mut self, header_hash: Hash, reports: &[WorkReport], max_len: usize) {
        let mut mmr = self
            .items
            .back()
            .map(|item| item.mmr.clone())
            .unwrap_or_default();

        let mut work_package_hashes = Vec::with_capacity(reports.len());
        let mut segment_roots = BTreeMap::new();
        for report in reports {
            mmr.append(report.package_hash);
            work_package_hashes.push(report.package_hash);
            segment_roots.insert(report.package_hash, report.segment_root);
        }

        self.items.push_back(HistoryItem {
            header_hash,
            state_root: None,
            mmr,
            work_package_hashes,
            segment_roots,
        });

        while self.items.len() > max_len {
            self.items.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(package_hash: Hash, segment_root: Hash) -> WorkReport {
        WorkReport {
            package_hash,
            core_index: 0,
            authorizer_hash: [0u8; 32],
            segment_root,
            dependencies: vec![],
            slot: 0,
            gas_used: 0,
        }
    }

    #[test]
    fn push_respects_the_configured_window() {
        let mut history = RecentHistory::new();
        for i in 0..6u8 {
            history.push([i; 32], &[], 4);
        }
        assert_eq!(history.items().len(), 4);
        assert_eq!(history.items().front().unwrap().header_hash, [2u8; 32]);
    }

    #[test]
    fn duplicate_package_hash_is_rejected() {
        let mut history = RecentHistory::new();
        history.push([1u8; 32], &[report([9u8; 32], [1u8; 32])], 4);
        assert!(history.check_not_duplicate(&[9u8; 32]).is_err());
        assert!(history.check_not_duplicate(&[8u8; 32]).is_ok());
    }

    #[test]
    fn mmr_accumulates_across_pushes() {
        let mut history = RecentHistory::new();
        history.push([1u8; 32], &[report([1u8; 32], [1u8; 32])], 4);
        history.push([2u8; 32], &[report([2u8; 32], [1u8; 32])], 4);
        let first_mmr = history.items()[0].mmr.clone();
        let second_mmr = history.items()[1].mmr.clone();
        assert_ne!(first_mmr.super_peak(), second_mmr.super_peak());
    }

    #[test]
    fn prior_state_root_is_set_on_the_latest_entry() {
        let mut history = RecentHistory::new();
        history.push([1u8; 32], &[], 4);
        history.set_prior_state_root([7u8; 32]);
        assert_eq!(history.items().back().unwrap().state_root, Some([7u8; 32]));
    }

    #[test]
    fn segment_root_resolves_against_the_retained_window() {
        let mut history = RecentHistory::new();
        history.push([1u8; 32], &[report([9u8; 32], [5u8; 32])], 4);
        assert_eq!(history.resolve_segment_root(&[9u8; 32]), Some([5u8; 32]));
        assert_eq!(history.resolve_segment_root(&[8u8; 32]), None);
    }
}
