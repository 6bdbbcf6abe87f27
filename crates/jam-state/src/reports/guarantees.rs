//! Guarantee processing: validating and admitting newly-guaranteed work reports.

use std::collections::BTreeMap;
use std::collections::HashSet;

use jam_crypto::ed25519;
use jam_primitives::hash::{Hash, ZERO_HASH};
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

use crate::assign::validate_guarantee_slot;
use crate::authorizers::AuthorizerState;
use crate::config::Config;
use crate::error::{Result, StfError};
use crate::history::RecentHistory;
use crate::types::{CoreIndex, Slot, ValidatorDescriptor, ValidatorIndex};

use super::pending::PendingReports;
use super::WorkReport;

/// One guarantor's endorsement of a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuarantorSignature {
    pub validator_index: ValidatorIndex,
    #[serde(with = "BigArray")]
    pub signature: [u8; 64],
}

/// A guarantee: a report endorsed by at least two validators assigned to its core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guarantee {
    pub report: WorkReport,
    pub signatures: Vec<GuarantorSignature>,
}

/// Process a block's guarantee extrinsic, admitting every report that passes
/// validation into `pending` and consuming the authorizer it spent from `authorizers`.
/// Returns the accepted reports, to be folded into recent history and routed to
/// accumulation once available.
pub fn process_guarantees(
    pending: &mut PendingReports,
    history: &RecentHistory,
    guarantees: &[Guarantee],
    assignment: &[CoreIndex],
    validators: &[ValidatorDescriptor],
    authorizers: &mut AuthorizerState,
    config: &Config,
    current_slot: Slot,
) -> Result<Vec<WorkReport>> {
    let mut seen_in_batch: HashSet<Hash> = HashSet::new();
    // Package hash -> segment root for every report already accepted earlier in this
    // batch, so a later report's dependency can resolve against it without waiting for
    // recent history to be updated.
    let mut batch_segment_roots: BTreeMap<Hash, Hash> = BTreeMap::new();
    let mut accepted = Vec::with_capacity(guarantees.len());

    for guarantee in guarantees {
        let report = &guarantee.report;

        if report.dependencies.len() > config.max_dependencies_per_report {
            return Err(StfError::TooManyDependencies);
        }
        if report.segment_root == ZERO_HASH {
            return Err(StfError::SegmentRootLookupInvalid);
        }
        let known_segment_root = batch_segment_roots
            .get(&report.package_hash)
            .copied()
            .or_else(|| history.resolve_segment_root(&report.package_hash));
        if let Some(known) = known_segment_root {
            if known != report.segment_root {
                return Err(StfError::SegmentRootLookupInvalid);
            }
        }
        if !seen_in_batch.insert(report.package_hash) {
            return Err(StfError::DuplicatePackageInGuarantees);
        }
        history.check_not_duplicate(&report.package_hash)?;

        for dependency in &report.dependencies {
            let resolvable = history
                .items()
                .iter()
                .any(|item| item.work_package_hashes.contains(dependency))
                || batch_segment_roots.contains_key(dependency);
            if !resolvable {
                return Err(StfError::DependencyMissing);
            }
        }

        validate_guarantee_slot(current_slot, report.slot, config.validator_rotation_period)?;

        if pending.is_engaged(report.core_index) {
            return Err(StfError::CoreEngaged(report.core_index));
        }

        if !authorizers.pool(report.core_index).contains(&report.authorizer_hash) {
            return Err(StfError::NotAuthorized(report.core_index));
        }

        if guarantee.signatures.len() < 2 {
            return Err(StfError::BadGuarantorAssignment);
        }

        let payload = report.signing_payload();
        for entry in &guarantee.signatures {
            let assigned_core = assignment
                .get(entry.validator_index as usize)
                .copied()
                .ok_or(StfError::BadGuarantorAssignment)?;
            if assigned_core != report.core_index {
                return Err(StfError::BadGuarantorAssignment);
            }
            let validator = validators
                .get(entry.validator_index as usize)
                .ok_or(StfError::BadGuarantorAssignment)?;
            ed25519::verify(&validator.ed25519, &payload, &entry.signature)?;
        }

        pending.engage(report.core_index, report.clone(), current_slot)?;
        authorizers.consume(report.core_index, &report.authorizer_hash)?;
        batch_segment_roots.insert(report.package_hash, report.segment_root);
        accepted.push(report.clone());
    }

    Ok(accepted)
}
