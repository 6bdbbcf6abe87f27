//! Safrole: the ticket-lottery block-production schedule (γ).

pub mod seal;
pub mod tickets;

use jam_primitives::hash::Hash;

use crate::config::Config;
use crate::types::ValidatorDescriptor;
use seal::{fallback_key_sequence, SealKeys};
use tickets::{select_epoch_tickets, Ticket};

/// γ: the Safrole sub-state. `next_validators` and `ring_commitment` describe the
/// validator set that will become active next epoch; `seal_keys` is this epoch's
/// slot-indexed production schedule; `ticket_accumulator` collects submissions for
/// the *next* epoch's schedule.
#[derive(Debug, Clone)]
pub struct SafroleState {
    pub next_validators: Vec<ValidatorDescriptor>,
    pub ring_commitment: Vec<u8>,
    pub seal_keys: SealKeys,
    pub ticket_accumulator: Vec<Ticket>,
}

impl SafroleState {
    /// Construct the genesis Safrole state: no tickets have been submitted yet, so the
    /// first epoch always runs in fallback mode.
    pub fn genesis(
        validators: &[ValidatorDescriptor],
        ring_commitment: Vec<u8>,
        genesis_entropy: &Hash,
        config: &Config,
    ) -> Self {
        Self {
            next_validators: validators.to_vec(),
            ring_commitment,
            seal_keys: SealKeys::Fallback(fallback_key_sequence(
                genesis_entropy,
                validators,
                config.epoch_length,
            )),
            ticket_accumulator: Vec::new(),
        }
    }

    /// Roll over the epoch boundary: select this epoch's seal key sequence from the
    /// outgoing ticket accumulator (or fall back to a shuffled key sequence if it never
    /// filled), clear the accumulator for the next epoch's submissions, and adopt the
    /// incoming validator set and ring commitment.
    pub fn transition_epoch(
        &mut self,
        new_active_validators: &[ValidatorDescriptor],
        new_ring_commitment: Vec<u8>,
        fallback_entropy: &Hash,
        config: &Config,
    ) {
        self.seal_keys = match select_epoch_tickets(&self.ticket_accumulator, config.epoch_length as usize) {
            Some(tickets) => SealKeys::Tickets(tickets),
            None => SealKeys::Fallback(fallback_key_sequence(
                fallback_entropy,
                new_active_validators,
                config.epoch_length,
            )),
        };
        self.ticket_accumulator.clear();
        self.next_validators = new_active_validators.to_vec();
        self.ring_commitment = new_ring_commitment;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator_with_key(key: u8) -> ValidatorDescriptor {
        let mut v = ValidatorDescriptor::zero();
        v.bandersnatch = [key; 32];
        v
    }

    #[test]
    fn genesis_runs_in_fallback_mode() {
        let validators: Vec<_> = (1..=6u8).map(validator_with_key).collect();
        let config = Config::tiny();
        let state = SafroleState::genesis(&validators, vec![1, 2, 3], &[0u8; 32], &config);
        assert!(matches!(state.seal_keys, SealKeys::Fallback(_)));
        assert_eq!(state.seal_keys.len(), config.epoch_length as usize);
    }

    #[test]
    fn full_accumulator_promotes_to_ticket_mode() {
        let validators: Vec<_> = (1..=6u8).map(validator_with_key).collect();
        let config = Config::tiny();
        let mut state = SafroleState::genesis(&validators, vec![1], &[0u8; 32], &config);
        state.ticket_accumulator = (0..config.epoch_length as u8)
            .map(|i| Ticket {
                id: [i; 32],
                attempt: 0,
            })
            .collect();

        state.transition_epoch(&validators, vec![2], &[9u8; 32], &config);

        assert!(matches!(state.seal_keys, SealKeys::Tickets(_)));
        assert!(state.ticket_accumulator.is_empty());
        assert_eq!(state.ring_commitment, vec![2]);
    }

    #[test]
    fn partial_accumulator_falls_back_and_still_clears() {
        let validators: Vec<_> = (1..=6u8).map(validator_with_key).collect();
        let config = Config::tiny();
        let mut state = SafroleState::genesis(&validators, vec![1], &[0u8; 32], &config);
        state.ticket_accumulator = vec![Ticket {
            id: [1u8; 32],
            attempt: 0,
        }];

        state.transition_epoch(&validators, vec![2], &[9u8; 32], &config);

        assert!(matches!(state.seal_keys, SealKeys::Fallback(_)));
        assert!(state.ticket_accumulator.is_empty());
    }
}
