//! Genesis state construction.

use jam_primitives::hash::Hash;

use crate::accumulated::AccumulatedWindow;
use crate::authorizers::AuthorizerState;
use crate::config::Config;
use crate::disputes::DisputesState;
use crate::envelope::JamState;
use crate::history::RecentHistory;
use crate::privileged::PrivilegedServices;
use crate::reports::pending::PendingReports;
use crate::safrole::SafroleState;
use crate::services::ServiceState;
use crate::stats::Statistics;
use crate::types::{EntropyPool, ValidatorDescriptor};

/// Build the genesis state for a validator set. The first epoch always starts in
/// fallback seal mode, since no tickets can have been submitted yet. There is no prior
/// epoch at genesis, so λ starts out equal to κ.
pub fn genesis_state(
    validators: Vec<ValidatorDescriptor>,
    ring_commitment: Vec<u8>,
    genesis_entropy: Hash,
    config: &Config,
) -> JamState {
    let safrole = SafroleState::genesis(&validators, ring_commitment, &genesis_entropy, config);
    JamState {
        slot: 0,
        entropy: EntropyPool::new(genesis_entropy),
        prior_validators: validators.clone(),
        current_validators: validators,
        safrole,
        recent_history: RecentHistory::new(),
        pending_reports: PendingReports::new(),
        disputes: DisputesState::new(),
        services: ServiceState::new(),
        stats: Statistics::new(config.validator_count, config.core_count),
        authorizers: AuthorizerState::new(),
        accumulated: AccumulatedWindow::genesis(config.epoch_length),
        privileged: PrivilegedServices::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safrole::seal::SealKeys;

    #[test]
    fn genesis_state_has_the_configured_validator_count_and_fallback_schedule() {
        let config = Config::tiny();
        let validators = vec![ValidatorDescriptor::zero(); config.validator_count];
        let state = genesis_state(validators, vec![1, 2, 3], [0u8; 32], &config);

        assert_eq!(state.current_validators.len(), config.validator_count);
        assert_eq!(state.slot, 0);
        assert!(matches!(state.safrole.seal_keys, SealKeys::Fallback(_)));
        assert_eq!(state.safrole.seal_keys.len(), config.epoch_length as usize);
    }
}
