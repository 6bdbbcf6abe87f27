//! Disputes: verdicts on contested work reports, and the culprits/faults extrinsics
//! that back them with offender evidence.

use std::collections::BTreeSet;

use jam_crypto::ed25519;
use jam_primitives::hash::Hash;
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

use crate::error::{Result, StfError};
use crate::types::ValidatorDescriptor;

const JUDGEMENT_CONTEXT: &[u8] = b"jam_judgement";
const CULPRIT_CONTEXT: &[u8] = b"jam_culprit";
const FAULT_CONTEXT: &[u8] = b"jam_fault";

/// One validator's vote on a disputed target: valid or invalid, signed, and dated to
/// the epoch in which the judgement was cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judgement {
    pub validator: [u8; 32],
    pub vote: bool,
    pub epoch: u32,
    #[serde(with = "BigArray")]
    pub signature: [u8; 64],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub target: Hash,
    pub judgements: Vec<Judgement>,
}

/// A guarantor implicated in guaranteeing a report that verdicted bad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Culprit {
    pub target: Hash,
    pub offender: [u8; 32],
    #[serde(with = "BigArray")]
    pub signature: [u8; 64],
}

/// A validator implicated in falsely attesting to a report that verdicted good.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fault {
    pub target: Hash,
    pub offender: [u8; 32],
    #[serde(with = "BigArray")]
    pub signature: [u8; 64],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisputesExtrinsic {
    pub verdicts: Vec<Verdict>,
    pub culprits: Vec<Culprit>,
    pub faults: Vec<Fault>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictOutcome {
    Good,
    Bad,
    Wonky,
}

/// ψ: the disputes sub-state — every target that has been judged, and every offender
/// key that has been reported and punished.
#[derive(Debug, Clone, Default)]
pub struct DisputesState {
    judged: BTreeSet<Hash>,
    offenders: BTreeSet<[u8; 32]>,
}

impl DisputesState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_judged(&self, target: &Hash) -> bool {
        self.judged.contains(target)
    }

    pub fn is_offender(&self, key: &[u8; 32]) -> bool {
        self.offenders.contains(key)
    }

    pub fn judged(&self) -> &BTreeSet<Hash> {
        &self.judged
    }

    pub fn offenders(&self) -> &BTreeSet<[u8; 32]> {
        &self.offenders
    }
}

fn classify(positive: usize, validator_count: usize) -> VerdictOutcome {
    let supermajority = (2 * validator_count) / 3 + 1;
    if positive >= supermajority {
        VerdictOutcome::Good
    } else if positive == 0 {
        VerdictOutcome::Bad
    } else {
        VerdictOutcome::Wonky
    }
}

fn verify_ascending<T>(items: &[T], key: impl Fn(&T) -> Hash) -> Result<()> {
    let mut last: Option<Hash> = None;
    for item in items {
        let k = key(item);
        if let Some(prev) = last {
            if k <= prev {
                return Err(StfError::BadExtrinsicOrder);
            }
        }
        last = Some(k);
    }
    Ok(())
}

/// Culprits and faults are grouped by the target they implicate (several offenders
/// can share one bad or good verdict), so only non-decreasing target order is
/// required, unlike verdicts' strictly-distinct targets.
fn verify_nondecreasing<T>(items: &[T], key: impl Fn(&T) -> Hash) -> Result<()> {
    let mut last: Option<Hash> = None;
    for item in items {
        let k = key(item);
        if let Some(prev) = last {
            if k < prev {
                return Err(StfError::BadExtrinsicOrder);
            }
        }
        last = Some(k);
    }
    Ok(())
}

/// Process a block's disputes extrinsic against `state`, verifying judgement and
/// offender signatures, checking ordering and vote-count-to-outcome consistency, and
/// recording newly judged targets and newly reported offenders. A judgement dated to
/// the current epoch must be signed by a member of `current_validators` (κ); one dated
/// to the prior epoch must be signed by a member of `prior_validators` (λ) — any other
/// age, or a signer absent from the epoch it claims, is rejected.
pub fn process_disputes(
    state: &mut DisputesState,
    extrinsic: &DisputesExtrinsic,
    current_validators: &[ValidatorDescriptor],
    prior_validators: &[ValidatorDescriptor],
    current_epoch: u32,
) -> Result<Vec<(Hash, VerdictOutcome)>> {
    verify_ascending(&extrinsic.verdicts, |v| v.target)?;
    verify_nondecreasing(&extrinsic.culprits, |c| c.target)?;
    verify_nondecreasing(&extrinsic.faults, |f| f.target)?;

    let mut outcomes = Vec::with_capacity(extrinsic.verdicts.len());

    for verdict in &extrinsic.verdicts {
        if state.is_judged(&verdict.target) {
            return Err(StfError::AlreadyJudged);
        }

        let mut positive = 0usize;
        for judgement in &verdict.judgements {
            let epoch_validators = if judgement.epoch == current_epoch {
                current_validators
            } else if judgement.epoch + 1 == current_epoch {
                prior_validators
            } else {
                return Err(StfError::BadJudgementAge);
            };
            if !epoch_validators.iter().any(|v| v.ed25519 == judgement.validator) {
                return Err(StfError::BadJudgementAge);
            }
            let mut message = Vec::with_capacity(JUDGEMENT_CONTEXT.len() + 33);
            message.extend_from_slice(JUDGEMENT_CONTEXT);
            message.extend_from_slice(&verdict.target);
            message.push(judgement.vote as u8);
            ed25519::verify(&judgement.validator, &message, &judgement.signature)?;
            if judgement.vote {
                positive += 1;
            }
        }

        let outcome = classify(positive, current_validators.len());
        if outcome == VerdictOutcome::Bad {
            let culprit_count = extrinsic
                .culprits
                .iter()
                .filter(|c| c.target == verdict.target)
                .count();
            if culprit_count < 2 {
                return Err(StfError::BadVerdictMissingCulprits);
            }
        }
        if outcome == VerdictOutcome::Good {
            let fault_count = extrinsic
                .faults
                .iter()
                .filter(|f| f.target == verdict.target)
                .count();
            if fault_count == 0 {
                return Err(StfError::GoodVerdictMissingFault);
            }
        }
        if outcome == VerdictOutcome::Wonky && positive != 0 {
            // Wonky is every split that is neither unanimous-bad nor supermajority-good;
            // nothing further to check beyond the classification itself.
        }

        outcomes.push((verdict.target, outcome));
    }

    let mut seen_offenders: BTreeSet<[u8; 32]> = BTreeSet::new();

    for culprit in &extrinsic.culprits {
        let mut message = Vec::with_capacity(CULPRIT_CONTEXT.len() + 32);
        message.extend_from_slice(CULPRIT_CONTEXT);
        message.extend_from_slice(&culprit.target);
        ed25519::verify(&culprit.offender, &message, &culprit.signature)?;
        if state.is_offender(&culprit.offender) || !seen_offenders.insert(culprit.offender) {
            return Err(StfError::OffenderAlreadyReported);
        }
    }
    for fault in &extrinsic.faults {
        let mut message = Vec::with_capacity(FAULT_CONTEXT.len() + 32);
        message.extend_from_slice(FAULT_CONTEXT);
        message.extend_from_slice(&fault.target);
        ed25519::verify(&fault.offender, &message, &fault.signature)?;
        if state.is_offender(&fault.offender) || !seen_offenders.insert(fault.offender) {
            return Err(StfError::OffenderAlreadyReported);
        }
    }

    for (target, _) in &outcomes {
        state.judged.insert(*target);
    }
    for culprit in &extrinsic.culprits {
        state.offenders.insert(culprit.offender);
    }
    for fault in &extrinsic.faults {
        state.offenders.insert(fault.offender);
    }

    Ok(outcomes)
}
