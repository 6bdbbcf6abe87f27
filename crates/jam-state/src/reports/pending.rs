//! ρ: per-core engagement of a guaranteed report awaiting availability.

use std::collections::BTreeMap;

use crate::error::{Result, StfError};
use crate::types::{CoreIndex, Slot};

use super::WorkReport;

#[derive(Debug, Clone)]
pub struct EngagedReport {
    pub report: WorkReport,
    pub guaranteed_at: Slot,
}

/// ρ: the set of cores currently holding a guaranteed-but-not-yet-available report.
#[derive(Debug, Clone, Default)]
pub struct PendingReports {
    engaged: BTreeMap<CoreIndex, EngagedReport>,
}

impl PendingReports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_engaged(&self, core: CoreIndex) -> bool {
        self.engaged.contains_key(&core)
    }

    pub fn get(&self, core: CoreIndex) -> Option<&EngagedReport> {
        self.engaged.get(&core)
    }

    pub fn engaged(&self) -> &BTreeMap<CoreIndex, EngagedReport> {
        &self.engaged
    }

    /// Engage `core` with a freshly guaranteed report. Fails if the core already
    /// holds one — a core's slot must be freed by availability or timeout first.
    pub fn engage(&mut self, core: CoreIndex, report: WorkReport, guaranteed_at: Slot) -> Result<()> {
        if self.engaged.contains_key(&core) {
            return Err(StfError::CoreEngaged(core));
        }
        self.engaged.insert(core, EngagedReport { report, guaranteed_at });
        Ok(())
    }

    /// Clear a core's engagement once its report becomes available (or times out),
    /// returning the report that was pending there.
    pub fn release(&mut self, core: CoreIndex) -> Option<WorkReport> {
        self.engaged.remove(&core).map(|engaged| engaged.report)
    }

    /// Evict any report whose guarantee slot is older than `current_slot - timeout`,
    /// freeing its core. Returns the cores that were freed this way.
    pub fn evict_timed_out(&mut self, current_slot: Slot, timeout: Slot) -> Vec<CoreIndex> {
        let expired: Vec<CoreIndex> = self
            .engaged
            .iter()
            .filter(|(_, engaged)| current_slot.saturating_sub(engaged.guaranteed_at) > timeout)
            .map(|(core, _)| *core)
            .collect();
        for core in &expired {
            self.engaged.remove(core);
        }
        expired
    }
}
