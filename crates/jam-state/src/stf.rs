//! The top-level state transition function: orchestrates every sub-transition in
//! order and produces the posterior state from a prior state and a block. On any
//! error the posterior is simply never built — nothing is written back until every
//! check has passed, so no partial state is ever observable.

use jam_crypto::RingVrfVerifier;
use jam_primitives::hash::{blake2b_256_concat, Hash};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::assign::{guarantor_assignment, select_rotation_entropy};
use crate::config::Config;
use crate::disputes::{process_disputes, DisputesExtrinsic};
use crate::envelope::JamState;
use crate::error::{Result, StfError};
use crate::reports::accumulation::accumulate;
use crate::reports::assurances::{process_assurances, Assurance};
use crate::reports::guarantees::{process_guarantees, Guarantee};
use crate::safrole::seal::verify_seal;
use crate::safrole::tickets::{process_tickets, TicketEnvelope};
use crate::types::{Slot, ValidatorIndex};

/// A block header's consensus-relevant fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub parent_hash: Hash,
    pub slot: Slot,
    pub author_index: ValidatorIndex,
    pub seal_signature: Vec<u8>,
}

impl Header {
    pub fn hash(&self) -> Hash {
        blake2b_256_concat(&[
            &self.parent_hash,
            &self.slot.to_le_bytes(),
            &self.author_index.to_le_bytes(),
            &self.seal_signature,
        ])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extrinsics {
    pub tickets: Vec<TicketEnvelope>,
    pub guarantees: Vec<Guarantee>,
    pub assurances: Vec<Assurance>,
    pub disputes: DisputesExtrinsic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub extrinsics: Extrinsics,
}

/// Import `block` against `prior`, returning the posterior state.
#[instrument(skip(prior, block, config, verifier), fields(slot = block.header.slot))]
pub fn import_block(
    prior: &JamState,
    block: &Block,
    config: &Config,
    verifier: &dyn RingVrfVerifier,
) -> Result<JamState> {
    if block.header.slot <= prior.slot {
        return Err(StfError::SlotMustAdvance {
            from: prior.slot,
            to: block.header.slot,
        });
    }

    let mut state = prior.clone();

    let prior_slot_in_epoch = prior.slot % config.epoch_length;
    let vrf_output = verify_seal(
        &state.safrole.seal_keys,
        prior_slot_in_epoch,
        &state.entropy.eta[3],
        &state.safrole.ring_commitment,
        &block.header.seal_signature,
        verifier,
    )?;
    debug!(?vrf_output, "seal verified");

    state.entropy.advance(&vrf_output);

    let prior_epoch = prior.slot / config.epoch_length;
    let new_epoch = block.header.slot / config.epoch_length;
    if new_epoch > prior_epoch {
        state.entropy.rotate_epoch();
        let fallback_entropy = state.entropy.eta[2];
        // λ ← κ, then κ ← γ.k (the next-epoch keys accumulated by Safrole), before
        // Safrole itself is advanced to compute the epoch-after-next's keys.
        state.prior_validators = state.current_validators.clone();
        state.current_validators = state.safrole.next_validators.clone();
        let ring_commitment = state.safrole.ring_commitment.clone();
        let next_validators = state.current_validators.clone();
        state
            .safrole
            .transition_epoch(&next_validators, ring_commitment, &fallback_entropy, config);
        state.stats.rotate_epoch();
        info!(epoch = new_epoch, "epoch rotated");
    }

    let slot_in_epoch = block.header.slot % config.epoch_length;
    process_tickets(
        &mut state.safrole.ticket_accumulator,
        &block.extrinsics.tickets,
        config,
        slot_in_epoch,
        &state.entropy.eta[2],
        &state.safrole.ring_commitment,
        verifier,
    )?;
    // Tickets are submitted anonymously behind a ring-VRF proof, so there is no
    // individual submitter identity to credit; attribute them to the block's author.
    for _ in &block.extrinsics.tickets {
        state.stats.record_ticket(block.header.author_index);
    }

    state.authorizers.rotate(config);

    let assignment_entropy = select_rotation_entropy(
        block.header.slot,
        block.header.slot,
        config.validator_rotation_period,
        &state.entropy.eta[2],
        &state.entropy.eta[3],
    );
    let assignment = guarantor_assignment(
        assignment_entropy,
        config.validator_count,
        config.core_count,
        block.header.slot,
        config.validator_rotation_period,
    );

    let accepted_reports = process_guarantees(
        &mut state.pending_reports,
        &state.recent_history,
        &block.extrinsics.guarantees,
        &assignment,
        &state.current_validators,
        &mut state.authorizers,
        config,
        block.header.slot,
    )?;
    for guarantee in &block.extrinsics.guarantees {
        for signature in &guarantee.signatures {
            state.stats.record_guarantee(signature.validator_index);
        }
    }

    let available_reports = process_assurances(
        &mut state.pending_reports,
        &block.extrinsics.assurances,
        &state.current_validators,
        config,
    )?;
    for assurance in &block.extrinsics.assurances {
        state.stats.record_assurance(assurance.validator_index);
    }

    let newly_accumulated = accumulate(
        &mut state.services,
        &mut state.stats,
        &state.privileged,
        &state.accumulated,
        &available_reports,
    )?;
    state.accumulated.shift(newly_accumulated, config.epoch_length);

    process_disputes(
        &mut state.disputes,
        &block.extrinsics.disputes,
        &state.current_validators,
        &state.prior_validators,
        new_epoch,
    )?;

    let header_hash = block.header.hash();
    state.recent_history.push(header_hash, &accepted_reports, config.recent_history_max);

    state.stats.record_block(block.header.author_index);
    state.slot = block.header.slot;

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::genesis_state;
    use jam_crypto::MockRingVerifier;
    use crate::types::ValidatorDescriptor;

    #[test]
    fn importing_a_block_with_a_non_advancing_slot_fails() {
        let config = Config::tiny();
        let validators = vec![ValidatorDescriptor::zero(); config.validator_count];
        let prior = genesis_state(validators, vec![1], [0u8; 32], &config);
        let block = Block {
            header: Header {
                parent_hash: [0u8; 32],
                slot: 0,
                author_index: 0,
                seal_signature: vec![1, 2, 3],
            },
            extrinsics: Extrinsics::default(),
        };
        let err = import_block(&prior, &block, &config, &MockRingVerifier).unwrap_err();
        assert_eq!(
            err,
            StfError::SlotMustAdvance { from: 0, to: 0 }
        );
    }

    #[test]
    fn importing_a_minimal_valid_block_advances_the_slot_and_records_the_author() {
        let config = Config::tiny();
        let validators = vec![ValidatorDescriptor::zero(); config.validator_count];
        let prior = genesis_state(validators, vec![1], [0u8; 32], &config);
        let block = Block {
            header: Header {
                parent_hash: [0u8; 32],
                slot: 1,
                author_index: 2,
                seal_signature: vec![9, 9, 9],
            },
            extrinsics: Extrinsics::default(),
        };
        let posterior = import_block(&prior, &block, &config, &MockRingVerifier).unwrap();

        assert_eq!(posterior.slot, 1);
        assert_eq!(posterior.stats.validator(2).blocks_produced, 1);
        assert_eq!(posterior.recent_history.items().len(), 1);
    }
}
