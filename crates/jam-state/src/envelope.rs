//! The full chain state: every σ-component a block import reads from and writes back
//! to, plus the state-root computation over all of them.

use jam_primitives::hash::Hash;

use crate::accumulated::AccumulatedWindow;
use crate::authorizers::AuthorizerState;
use crate::disputes::DisputesState;
use crate::history::RecentHistory;
use crate::merklize::{state_root, StateView};
use crate::privileged::PrivilegedServices;
use crate::reports::pending::PendingReports;
use crate::safrole::SafroleState;
use crate::services::ServiceState;
use crate::stats::Statistics;
use crate::types::{EntropyPool, Slot, ValidatorDescriptor};

/// The complete merklizable chain state.
#[derive(Debug, Clone)]
pub struct JamState {
    pub slot: Slot,
    pub entropy: EntropyPool,
    pub current_validators: Vec<ValidatorDescriptor>,
    pub prior_validators: Vec<ValidatorDescriptor>,
    pub safrole: SafroleState,
    pub recent_history: RecentHistory,
    pub pending_reports: PendingReports,
    pub disputes: DisputesState,
    pub services: ServiceState,
    pub stats: Statistics,
    pub authorizers: AuthorizerState,
    pub accumulated: AccumulatedWindow,
    pub privileged: PrivilegedServices,
}

impl JamState {
    pub fn state_root(&self) -> Hash {
        let service_ids = self.services.ids();
        let view = StateView {
            slot: self.slot,
            entropy: &self.entropy,
            safrole: &self.safrole,
            recent_history: &self.recent_history,
            disputes: &self.disputes,
            services: &self.services,
            stats: &self.stats,
            current_validators: &self.current_validators,
            prior_validators: &self.prior_validators,
            pending_reports: &self.pending_reports,
            authorizers: &self.authorizers,
            accumulated: &self.accumulated,
            privileged: &self.privileged,
            service_ids: &service_ids,
        };
        state_root(&view)
    }
}
