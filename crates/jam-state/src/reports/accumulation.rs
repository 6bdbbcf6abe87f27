//! Accumulation: crediting services for work reports that became available, recording
//! the gas they consumed, and paying out the always-accumulate set privileged services
//! (χ) carry independent of any fresh report.

use jam_primitives::hash::Hash;

use crate::accumulated::AccumulatedWindow;
use crate::error::Result;
use crate::privileged::PrivilegedServices;
use crate::services::ServiceState;
use crate::stats::Statistics;
use crate::types::{Balance, CoreIndex, ServiceId};

use super::WorkReport;

/// Map a work report to the service it accumulates into. Reports are routed by the
/// low 32 bits of their authorizer hash, mirroring how a work package's authorizer
/// identifies its owning service.
fn owning_service(report: &WorkReport) -> ServiceId {
    u32::from_le_bytes(report.authorizer_hash[0..4].try_into().unwrap())
}

/// Gas-to-balance conversion rate for the reward a service earns per unit of gas its
/// reports consume.
const REWARD_PER_GAS_UNIT: Balance = 1;

/// Apply accumulation for every newly-available report that has not already been
/// accumulated in this epoch's ξ window: credit its owning service, record the core's
/// cumulative gas usage, then pay every always-accumulate service in χ regardless of
/// whether it has a fresh report this block. Returns the package hashes accumulated
/// this block, for the caller to shift into ξ. Per-validator statistics are left to the
/// caller, since the reporting validator is not modeled on [`WorkReport`] itself.
pub fn accumulate(
    services: &mut ServiceState,
    stats: &mut Statistics,
    privileged: &PrivilegedServices,
    accumulated: &AccumulatedWindow,
    available: &[WorkReport],
) -> Result<Vec<Hash>> {
    let mut newly_accumulated = Vec::with_capacity(available.len());

    for report in available {
        if accumulated.contains(&report.package_hash) {
            continue;
        }
        let service_id = owning_service(report);
        let reward = report.gas_used.saturating_mul(REWARD_PER_GAS_UNIT);
        if services.get(service_id).is_some() {
            services.credit(service_id, reward)?;
        }
        stats.record_core_gas(report.core_index, report.gas_used);
        newly_accumulated.push(report.package_hash);
    }

    for (&service_id, &gas) in &privileged.always_accumulate {
        if services.get(service_id).is_some() {
            services.credit(service_id, gas.saturating_mul(REWARD_PER_GAS_UNIT))?;
        }
    }

    Ok(newly_accumulated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceAccount;
    use std::collections::BTreeMap;

    fn report(core: CoreIndex, gas: u64) -> WorkReport {
        let mut authorizer_hash = [0u8; 32];
        authorizer_hash[0..4].copy_from_slice(&7u32.to_le_bytes());
        WorkReport {
            package_hash: [1u8; 32],
            core_index: core,
            authorizer_hash,
            segment_root: [2u8; 32],
            dependencies: vec![],
            slot: 0,
            gas_used: gas,
        }
    }

    #[test]
    fn credits_the_owning_service_and_records_core_gas() {
        let mut services = ServiceState::new();
        services.insert(7, ServiceAccount::new([0u8; 32], 0));
        let mut stats = Statistics::new(2, 2);
        let privileged = PrivilegedServices::new();
        let accumulated = AccumulatedWindow::genesis(12);

        let newly = accumulate(&mut services, &mut stats, &privileged, &accumulated, &[report(0, 100)]).unwrap();

        assert_eq!(services.get(7).unwrap().balance, 100);
        assert_eq!(stats.core_gas_used(0), 100);
        assert_eq!(newly, vec![[1u8; 32]]);
    }

    #[test]
    fn unknown_service_is_skipped_but_gas_still_recorded() {
        let mut services = ServiceState::new();
        let mut stats = Statistics::new(2, 2);
        let privileged = PrivilegedServices::new();
        let accumulated = AccumulatedWindow::genesis(12);

        accumulate(&mut services, &mut stats, &privileged, &accumulated, &[report(1, 50)]).unwrap();

        assert_eq!(stats.core_gas_used(1), 50);
    }

    #[test]
    fn a_package_already_in_the_accumulated_window_is_not_paid_out_twice() {
        let mut services = ServiceState::new();
        services.insert(7, ServiceAccount::new([0u8; 32], 0));
        let mut stats = Statistics::new(2, 2);
        let privileged = PrivilegedServices::new();
        let mut accumulated = AccumulatedWindow::genesis(2);
        accumulated.shift(vec![[1u8; 32]], 2);

        let newly = accumulate(&mut services, &mut stats, &privileged, &accumulated, &[report(0, 100)]).unwrap();

        assert!(newly.is_empty());
        assert_eq!(services.get(7).unwrap().balance, 0);
    }

    #[test]
    fn always_accumulate_services_are_credited_even_without_a_fresh_report() {
        let mut services = ServiceState::new();
        services.insert(3, ServiceAccount::new([0u8; 32], 0));
        let mut stats = Statistics::new(2, 2);
        let mut privileged = PrivilegedServices::new();
        privileged.always_accumulate = BTreeMap::from([(3u32, 20u64)]);
        let accumulated = AccumulatedWindow::genesis(12);

        accumulate(&mut services, &mut stats, &privileged, &accumulated, &[]).unwrap();

        assert_eq!(services.get(3).unwrap().balance, 20);
    }
}
