//! α/φ: per-core authorizer pools and the queues that feed them. Each core keeps a
//! bounded pool of currently-approved authorizer hashes (α, max length `O`) fed one
//! entry per block from a bounded queue (φ, max length `Q`); a guarantee consumes an
//! authorizer from its core's pool the moment it uses it.

use std::collections::BTreeMap;

use jam_primitives::hash::Hash;

use crate::config::Config;
use crate::error::{Result, StfError};
use crate::types::CoreIndex;

/// α/φ: every core's authorizer pool and the queue feeding it.
#[derive(Debug, Clone, Default)]
pub struct AuthorizerState {
    pools: BTreeMap<CoreIndex, Vec<Hash>>,
    queues: BTreeMap<CoreIndex, Vec<Hash>>,
}

impl AuthorizerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(&self, core: CoreIndex) -> &[Hash] {
        self.pools.get(&core).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn queue(&self, core: CoreIndex) -> &[Hash] {
        self.queues.get(&core).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn pools(&self) -> &BTreeMap<CoreIndex, Vec<Hash>> {
        &self.pools
    }

    pub fn queues(&self) -> &BTreeMap<CoreIndex, Vec<Hash>> {
        &self.queues
    }

    /// Seed a core's pool directly. There is no `assign` extrinsic in this
    /// implementation, so genesis and tests populate pools this way rather than
    /// draining them from a queue.
    pub fn seed_pool(&mut self, core: CoreIndex, hashes: Vec<Hash>) {
        self.pools.insert(core, hashes);
    }

    /// Append `hash` to `core`'s queue, failing once it would exceed `Q`.
    pub fn enqueue(&mut self, core: CoreIndex, hash: Hash, max_queue: usize) -> Result<()> {
        let queue = self.queues.entry(core).or_default();
        if queue.len() >= max_queue {
            return Err(StfError::CapacityExceeded("authorizer_queue"));
        }
        queue.push(hash);
        Ok(())
    }

    /// Shift the oldest queued entry into each core's pool, evicting the oldest pool
    /// entry beyond `O`. Called once per block.
    pub fn rotate(&mut self, config: &Config) {
        for core in 0..config.core_count as CoreIndex {
            let shifted = self.queues.get_mut(&core).filter(|q| !q.is_empty()).map(|q| q.remove(0));
            if let Some(hash) = shifted {
                let pool = self.pools.entry(core).or_default();
                pool.push(hash);
                while pool.len() > config.authorizer_pool_max {
                    pool.remove(0);
                }
            }
        }
    }

    /// Remove `hash` from `core`'s pool once a guarantee has used it. An authorizer is
    /// spent the moment it backs a report.
    pub fn consume(&mut self, core: CoreIndex, hash: &Hash) -> Result<()> {
        let pool = self.pools.get_mut(&core).ok_or(StfError::NotAuthorized(core))?;
        let position = pool.iter().position(|h| h == hash).ok_or(StfError::NotAuthorized(core))?;
        pool.remove(position);
        Ok(())
    }
}
