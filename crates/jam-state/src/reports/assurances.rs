//! Availability assurances: validators attesting that a pending report's data is
//! retrievable, and the supermajority threshold that moves a report to accumulation.

use jam_crypto::ed25519;
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

use crate::config::Config;
use crate::error::Result;
use crate::types::{CoreIndex, ValidatorDescriptor, ValidatorIndex};

use super::pending::PendingReports;
use super::WorkReport;

const ASSURANCE_CONTEXT: &[u8] = b"jam_assurance";

/// One validator's availability bitfield: one bit per core, set where that validator
/// attests the core's pending report is available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assurance {
    pub validator_index: ValidatorIndex,
    pub bitfield: Vec<bool>,
    #[serde(with = "BigArray")]
    pub signature: [u8; 64],
}

fn assurance_message(bitfield: &[bool]) -> Vec<u8> {
    let mut message = Vec::with_capacity(ASSURANCE_CONTEXT.len() + bitfield.len());
    message.extend_from_slice(ASSURANCE_CONTEXT);
    message.extend(bitfield.iter().map(|&b| b as u8));
    message
}

/// Supermajority threshold over the full validator set: more than two thirds.
pub fn availability_threshold(validator_count: usize) -> usize {
    (2 * validator_count) / 3 + 1
}

/// Tally a block's assurance extrinsic against `pending`, releasing and returning
/// every core whose engaged report crosses the availability threshold.
pub fn process_assurances(
    pending: &mut PendingReports,
    assurances: &[Assurance],
    validators: &[ValidatorDescriptor],
    config: &Config,
) -> Result<Vec<WorkReport>> {
    let mut counts = vec![0usize; config.core_count];

    for assurance in assurances {
        let validator = match validators.get(assurance.validator_index as usize) {
            Some(v) => v,
            None => continue,
        };
        let message = assurance_message(&assurance.bitfield);
        if ed25519::verify(&validator.ed25519, &message, &assurance.signature).is_err() {
            continue;
        }
        for (core, bit) in assurance.bitfield.iter().enumerate() {
            if *bit && core < counts.len() {
                counts[core] += 1;
            }
        }
    }

    let threshold = availability_threshold(validators.len());
    let mut newly_available = Vec::new();
    for (core, count) in counts.into_iter().enumerate() {
        if count >= threshold && pending.is_engaged(core as CoreIndex) {
            if let Some(report) = pending.release(core as CoreIndex) {
                newly_available.push(report);
            }
        }
    }

    Ok(newly_available)
}
