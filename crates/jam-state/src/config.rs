//! Runtime configuration parameters threaded through every sub-transition.
//!
//! A runtime record rather than compile-time generics, so the same binary can run the
//! full JAM parameter set in production and a tiny parameter set for conformance
//! scenarios (e.g. `N=6, epoch_length=12, C=2`). Parameters are fixed for the lifetime
//! of a `Config` value; nothing in the STF mutates one mid-run.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// N: validator set size.
    pub validator_count: usize,
    /// C: core count.
    pub core_count: usize,
    /// Epoch length in slots.
    pub epoch_length: u32,
    /// Slot-in-epoch at which ticket submission closes.
    pub ticket_submission_end_epoch_slot: u32,
    /// Maximum ticket attempts per validator per epoch.
    pub max_ticket_entries_per_validator: u32,
    /// Maximum ticket envelopes accepted in a single extrinsic.
    pub max_tickets_per_extrinsic: usize,
    /// O: maximum authorizer-pool length per core.
    pub authorizer_pool_max: usize,
    /// Q: maximum authorizer-queue length per core.
    pub authorizer_queue_max: usize,
    /// H: maximum recent-history length.
    pub recent_history_max: usize,
    /// R: validator rotation period, in slots.
    pub validator_rotation_period: u32,
    /// Maximum dependency count on a single work report.
    pub max_dependencies_per_report: usize,
}

impl Default for Config {
    /// Full-size JAM parameters (graypaper defaults), *not* the tiny parameters used by
    /// individual conformance scenarios — those construct their own `Config`.
    fn default() -> Self {
        const EPOCH_LENGTH: u32 = 600;
        Self {
            validator_count: 1023,
            core_count: 341,
            epoch_length: EPOCH_LENGTH,
            ticket_submission_end_epoch_slot: (EPOCH_LENGTH * 2) / 3,
            max_ticket_entries_per_validator: 2,
            max_tickets_per_extrinsic: EPOCH_LENGTH as usize,
            authorizer_pool_max: 8,
            authorizer_queue_max: 80,
            recent_history_max: 8,
            validator_rotation_period: 10,
            max_dependencies_per_report: 8,
        }
    }
}

impl Config {
    /// Tiny conformance parameters (`N=6, epoch_length=12, C=2`).
    pub fn tiny() -> Self {
        Self {
            validator_count: 6,
            core_count: 2,
            epoch_length: 12,
            ticket_submission_end_epoch_slot: 8,
            max_ticket_entries_per_validator: 2,
            max_tickets_per_extrinsic: 12,
            authorizer_pool_max: 4,
            authorizer_queue_max: 8,
            recent_history_max: 4,
            validator_rotation_period: 2,
            max_dependencies_per_report: 4,
        }
    }

    pub fn validators_per_core(&self) -> usize {
        self.validator_count / self.core_count
    }
}
