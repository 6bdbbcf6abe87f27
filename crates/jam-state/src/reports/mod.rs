//! Work reports: guarantee submission, availability assurance, and accumulation.

pub mod accumulation;
pub mod assurances;
pub mod guarantees;
pub mod pending;

use jam_primitives::hash::Hash;
use serde::{Deserialize, Serialize};

use crate::types::{CoreIndex, Slot};

/// A guaranteed work report: the package it covers, the core it targets, the
/// authorizer that permitted it, the segment root committing to its exported data,
/// and the other work-package hashes it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkReport {
    pub package_hash: Hash,
    pub core_index: CoreIndex,
    pub authorizer_hash: Hash,
    pub segment_root: Hash,
    pub dependencies: Vec<Hash>,
    pub slot: Slot,
    pub gas_used: u64,
}

impl WorkReport {
    /// Bytes signed by guarantors and assurers: simple concatenation of the report's
    /// identifying fields, sufficient for a deterministic, replayable signing message.
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(32 + 2 + 32 + 32 + self.dependencies.len() * 32 + 4);
        bytes.extend_from_slice(&self.package_hash);
        bytes.extend_from_slice(&self.core_index.to_le_bytes());
        bytes.extend_from_slice(&self.authorizer_hash);
        bytes.extend_from_slice(&self.segment_root);
        for dep in &self.dependencies {
            bytes.extend_from_slice(dep);
        }
        bytes.extend_from_slice(&self.slot.to_le_bytes());
        bytes
    }
}
