//! State merklization: flatten the posterior state into the bit-partitioned Patricia
//! trie's leaf dictionary and compute its root.

use jam_primitives::hash::Hash;
use jam_primitives::keys::{component_key, service_base_key, service_preimage_key, service_storage_key};
use jam_primitives::trie::{compute_root, Dictionary};
use parity_scale_codec::Encode;

use crate::accumulated::AccumulatedWindow;
use crate::authorizers::AuthorizerState;
use crate::disputes::DisputesState;
use crate::history::RecentHistory;
use crate::privileged::PrivilegedServices;
use crate::reports::pending::PendingReports;
use crate::safrole::SafroleState;
use crate::services::ServiceState;
use crate::stats::Statistics;
use crate::types::{EntropyPool, Slot, ValidatorDescriptor};

/// Deterministic byte encoding for components that aren't plain SCALE types. Every
/// implementation here is length-prefixed so nested variable-size fields never bleed
/// into one another.
trait MerkleEncode {
    fn merkle_bytes(&self) -> Vec<u8>;
}

fn push_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
}

impl MerkleEncode for SafroleState {
    fn merkle_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        push_len_prefixed(&mut out, &self.next_validators.encode());
        push_len_prefixed(&mut out, &self.ring_commitment);
        match &self.seal_keys {
            crate::safrole::seal::SealKeys::Tickets(tickets) => {
                out.push(0);
                out.extend_from_slice(&(tickets.len() as u32).to_le_bytes());
                for ticket in tickets {
                    out.extend_from_slice(&ticket.id);
                    out.push(ticket.attempt);
                }
            }
            crate::safrole::seal::SealKeys::Fallback(keys) => {
                out.push(1);
                out.extend_from_slice(&(keys.len() as u32).to_le_bytes());
                for key in keys {
                    out.extend_from_slice(key);
                }
            }
        }
        out.extend_from_slice(&(self.ticket_accumulator.len() as u32).to_le_bytes());
        for ticket in &self.ticket_accumulator {
            out.extend_from_slice(&ticket.id);
            out.push(ticket.attempt);
        }
        out
    }
}

impl MerkleEncode for RecentHistory {
    fn merkle_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.items().len() as u32).to_le_bytes());
        for item in self.items() {
            out.extend_from_slice(&item.header_hash);
            out.extend_from_slice(&item.state_root.unwrap_or(jam_primitives::hash::ZERO_HASH));
            out.extend_from_slice(&item.mmr.super_peak());
            out.extend_from_slice(&(item.work_package_hashes.len() as u32).to_le_bytes());
            for hash in &item.work_package_hashes {
                out.extend_from_slice(hash);
            }
        }
        out
    }
}

impl MerkleEncode for DisputesState {
    fn merkle_bytes(&self) -> Vec<u8> {
        // Both sets are already canonically ordered by `BTreeSet`.
        let mut out = Vec::new();
        out.extend_from_slice(&(self.judged().len() as u32).to_le_bytes());
        for target in self.judged() {
            out.extend_from_slice(target);
        }
        out.extend_from_slice(&(self.offenders().len() as u32).to_le_bytes());
        for offender in self.offenders() {
            out.extend_from_slice(offender);
        }
        out
    }
}

impl MerkleEncode for ServiceState {
    fn merkle_bytes(&self) -> Vec<u8> {
        // Service accounts are merklized individually under their own subtree keys
        // (see [`component_entries`]); this component slot only carries a marker so the
        // top-level trie has a stable entry even with zero services.
        Vec::new()
    }
}

impl MerkleEncode for Statistics {
    fn merkle_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.validators().len() as u32).to_le_bytes());
        for stats in self.validators() {
            out.extend_from_slice(&stats.blocks_produced.to_le_bytes());
            out.extend_from_slice(&stats.tickets_submitted.to_le_bytes());
            out.extend_from_slice(&stats.guarantees_submitted.to_le_bytes());
            out.extend_from_slice(&stats.assurances_submitted.to_le_bytes());
        }
        out.extend_from_slice(&(self.cores_gas_used().len() as u32).to_le_bytes());
        for gas in self.cores_gas_used() {
            out.extend_from_slice(&gas.to_le_bytes());
        }
        out
    }
}

impl MerkleEncode for PendingReports {
    fn merkle_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.engaged().len() as u32).to_le_bytes());
        for (core, engaged) in self.engaged() {
            out.extend_from_slice(&core.to_le_bytes());
            out.extend_from_slice(&engaged.guaranteed_at.to_le_bytes());
            let report = &engaged.report;
            out.extend_from_slice(&report.package_hash);
            out.extend_from_slice(&report.core_index.to_le_bytes());
            out.extend_from_slice(&report.authorizer_hash);
            out.extend_from_slice(&report.segment_root);
            out.extend_from_slice(&report.slot.to_le_bytes());
            out.extend_from_slice(&report.gas_used.to_le_bytes());
            out.extend_from_slice(&(report.dependencies.len() as u32).to_le_bytes());
            for dependency in &report.dependencies {
                out.extend_from_slice(dependency);
            }
        }
        out
    }
}

impl MerkleEncode for AuthorizerState {
    fn merkle_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.pools().len() as u32).to_le_bytes());
        for (core, pool) in self.pools() {
            out.extend_from_slice(&core.to_le_bytes());
            out.extend_from_slice(&(pool.len() as u32).to_le_bytes());
            for hash in pool {
                out.extend_from_slice(hash);
            }
        }
        out.extend_from_slice(&(self.queues().len() as u32).to_le_bytes());
        for (core, queue) in self.queues() {
            out.extend_from_slice(&core.to_le_bytes());
            out.extend_from_slice(&(queue.len() as u32).to_le_bytes());
            for hash in queue {
                out.extend_from_slice(hash);
            }
        }
        out
    }
}

impl MerkleEncode for AccumulatedWindow {
    fn merkle_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.blocks().len() as u32).to_le_bytes());
        for block in self.blocks() {
            out.extend_from_slice(&(block.len() as u32).to_le_bytes());
            for hash in block {
                out.extend_from_slice(hash);
            }
        }
        out
    }
}

impl MerkleEncode for PrivilegedServices {
    fn merkle_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for id in [self.manager, self.assign, self.designate, self.registrar] {
            match id {
                Some(id) => {
                    out.push(1);
                    out.extend_from_slice(&id.to_le_bytes());
                }
                None => out.push(0),
            }
        }
        out.extend_from_slice(&(self.always_accumulate.len() as u32).to_le_bytes());
        for (service_id, gas) in &self.always_accumulate {
            out.extend_from_slice(&service_id.to_le_bytes());
            out.extend_from_slice(&gas.to_le_bytes());
        }
        out
    }
}

const COMPONENT_ENTROPY: u8 = 1;
const COMPONENT_SAFROLE: u8 = 2;
const COMPONENT_RECENT_HISTORY: u8 = 3;
const COMPONENT_DISPUTES: u8 = 4;
const COMPONENT_SERVICES_MARKER: u8 = 5;
const COMPONENT_STATS: u8 = 6;
const COMPONENT_SLOT: u8 = 7;
const COMPONENT_CURRENT_VALIDATORS: u8 = 8;
const COMPONENT_PRIOR_VALIDATORS: u8 = 9;
const COMPONENT_PENDING_REPORTS: u8 = 10;
const COMPONENT_AUTHORIZERS: u8 = 11;
const COMPONENT_ACCUMULATED: u8 = 12;
const COMPONENT_PRIVILEGED: u8 = 13;

/// Everything merklization needs a read-only view of. Kept as borrows rather than an
/// owned aggregate so callers don't need a single monolithic state struct just to take
/// a state-root snapshot.
pub struct StateView<'a> {
    pub slot: Slot,
    pub entropy: &'a EntropyPool,
    pub safrole: &'a SafroleState,
    pub recent_history: &'a RecentHistory,
    pub disputes: &'a DisputesState,
    pub services: &'a ServiceState,
    pub stats: &'a Statistics,
    pub current_validators: &'a [ValidatorDescriptor],
    pub prior_validators: &'a [ValidatorDescriptor],
    pub pending_reports: &'a PendingReports,
    pub authorizers: &'a AuthorizerState,
    pub accumulated: &'a AccumulatedWindow,
    pub privileged: &'a PrivilegedServices,
    pub service_ids: &'a [crate::types::ServiceId],
}

/// Build the full leaf dictionary for `view`: the fixed top-level components plus one
/// subtree entry per service account (base record, storage items, and preimages).
pub fn component_entries(view: &StateView<'_>) -> Dictionary {
    let mut dict = Dictionary::new();

    dict.insert(component_key(COMPONENT_ENTROPY), view.entropy.encode());
    dict.insert(component_key(COMPONENT_SAFROLE), view.safrole.merkle_bytes());
    dict.insert(
        component_key(COMPONENT_RECENT_HISTORY),
        view.recent_history.merkle_bytes(),
    );
    dict.insert(component_key(COMPONENT_DISPUTES), view.disputes.merkle_bytes());
    dict.insert(
        component_key(COMPONENT_SERVICES_MARKER),
        view.services.merkle_bytes(),
    );
    dict.insert(component_key(COMPONENT_STATS), view.stats.merkle_bytes());
    dict.insert(component_key(COMPONENT_SLOT), view.slot.to_le_bytes().to_vec());
    dict.insert(
        component_key(COMPONENT_CURRENT_VALIDATORS),
        view.current_validators.to_vec().encode(),
    );
    dict.insert(
        component_key(COMPONENT_PRIOR_VALIDATORS),
        view.prior_validators.to_vec().encode(),
    );
    dict.insert(
        component_key(COMPONENT_PENDING_REPORTS),
        view.pending_reports.merkle_bytes(),
    );
    dict.insert(component_key(COMPONENT_AUTHORIZERS), view.authorizers.merkle_bytes());
    dict.insert(component_key(COMPONENT_ACCUMULATED), view.accumulated.merkle_bytes());
    dict.insert(component_key(COMPONENT_PRIVILEGED), view.privileged.merkle_bytes());

    for &service_id in view.service_ids {
        let Some(account) = view.services.get(service_id) else {
            continue;
        };
        let mut base = Vec::with_capacity(8 + 32);
        base.extend_from_slice(&account.balance.to_le_bytes());
        base.extend_from_slice(&account.code_hash);
        dict.insert(service_base_key(service_id), base);

        for (storage_key, value) in &account.storage {
            let content_hash = jam_primitives::hash::blake2b_256(storage_key);
            dict.insert(service_storage_key(service_id, &content_hash), value.clone());
        }
        for (preimage_hash, blob) in &account.preimages {
            dict.insert(service_preimage_key(service_id, preimage_hash), blob.clone());
        }
    }

    dict
}

pub fn state_root(view: &StateView<'_>) -> Hash {
    compute_root(&component_entries(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::ServiceAccount;

    #[test]
    fn state_root_changes_when_entropy_changes() {
        let config = Config::tiny();
        let services = ServiceState::new();
        let stats = Statistics::new(config.validator_count, config.core_count);
        let disputes = DisputesState::new();
        let history = RecentHistory::new();
        let validators = vec![crate::types::ValidatorDescriptor::zero(); config.validator_count];
        let safrole = SafroleState::genesis(&validators, vec![1], &[0u8; 32], &config);
        let pending_reports = PendingReports::new();
        let authorizers = AuthorizerState::new();
        let accumulated = AccumulatedWindow::genesis(config.epoch_length);
        let privileged = PrivilegedServices::new();

        let entropy_a = EntropyPool::new([1u8; 32]);
        let entropy_b = EntropyPool::new([2u8; 32]);

        let view_a = StateView {
            slot: 0,
            entropy: &entropy_a,
            safrole: &safrole,
            recent_history: &history,
            disputes: &disputes,
            services: &services,
            stats: &stats,
            current_validators: &validators,
            prior_validators: &validators,
            pending_reports: &pending_reports,
            authorizers: &authorizers,
            accumulated: &accumulated,
            privileged: &privileged,
            service_ids: &[],
        };
        let view_b = StateView {
            entropy: &entropy_b,
            ..view_a
        };

        assert_ne!(state_root(&view_a), state_root(&view_b));
    }

    #[test]
    fn service_accounts_contribute_to_the_root() {
        let config = Config::tiny();
        let mut services = ServiceState::new();
        let stats = Statistics::new(config.validator_count, config.core_count);
        let disputes = DisputesState::new();
        let history = RecentHistory::new();
        let validators = vec![crate::types::ValidatorDescriptor::zero(); config.validator_count];
        let safrole = SafroleState::genesis(&validators, vec![1], &[0u8; 32], &config);
        let entropy = EntropyPool::new([0u8; 32]);
        let pending_reports = PendingReports::new();
        let authorizers = AuthorizerState::new();
        let accumulated = AccumulatedWindow::genesis(config.epoch_length);
        let privileged = PrivilegedServices::new();

        let view_without = StateView {
            slot: 0,
            entropy: &entropy,
            safrole: &safrole,
            recent_history: &history,
            disputes: &disputes,
            services: &services,
            stats: &stats,
            current_validators: &validators,
            prior_validators: &validators,
            pending_reports: &pending_reports,
            authorizers: &authorizers,
            accumulated: &accumulated,
            privileged: &privileged,
            service_ids: &[],
        };
        let root_without = state_root(&view_without);

        services.insert(7, ServiceAccount::new([0u8; 32], 100));
        let view_with = StateView {
            service_ids: &[7],
            ..view_without
        };
        let root_with = state_root(&view_with);

        assert_ne!(root_without, root_with);
    }

    #[test]
    fn the_accumulated_window_contributes_to_the_root() {
        let config = Config::tiny();
        let services = ServiceState::new();
        let stats = Statistics::new(config.validator_count, config.core_count);
        let disputes = DisputesState::new();
        let history = RecentHistory::new();
        let validators = vec![crate::types::ValidatorDescriptor::zero(); config.validator_count];
        let safrole = SafroleState::genesis(&validators, vec![1], &[0u8; 32], &config);
        let entropy = EntropyPool::new([0u8; 32]);
        let pending_reports = PendingReports::new();
        let authorizers = AuthorizerState::new();
        let privileged = PrivilegedServices::new();

        let empty_window = AccumulatedWindow::genesis(config.epoch_length);
        let view_empty = StateView {
            slot: 0,
            entropy: &entropy,
            safrole: &safrole,
            recent_history: &history,
            disputes: &disputes,
            services: &services,
            stats: &stats,
            current_validators: &validators,
            prior_validators: &validators,
            pending_reports: &pending_reports,
            authorizers: &authorizers,
            accumulated: &empty_window,
            privileged: &privileged,
            service_ids: &[],
        };
        let root_empty = state_root(&view_empty);

        let mut shifted_window = AccumulatedWindow::genesis(config.epoch_length);
        shifted_window.shift(vec![[9u8; 32]], config.epoch_length);
        let view_shifted = StateView {
            accumulated: &shifted_window,
            ..view_empty
        };
        let root_shifted = state_root(&view_shifted);

        assert_ne!(root_empty, root_shifted);
    }
}
