//! Per-node visual seeds.
//!
//! Every scene gets one uniform draw in `[0, SEED_MAX]` when a story loads,
//! before anything is rendered, so repeated renders of the same scene stay
//! visually stable for the whole session. A new story load redraws
//! everything: seeds are never reused across sessions, even for colliding
//! node ids.

use crate::graph::NodeId;
use rand::Rng;
use std::collections::HashMap;

/// Upper bound (inclusive) of the seed range.
pub const SEED_MAX: u32 = 999_999;

/// Seeds keyed by node id, drawn once per loaded graph.
#[derive(Debug, Clone, Default)]
pub struct SeedTable {
    seeds: HashMap<NodeId, u32>,
}

impl SeedTable {
    /// Draw one independent seed per node id using the thread RNG.
    pub fn assign<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a NodeId>,
    {
        Self::assign_with_rng(ids, &mut rand::thread_rng())
    }

    /// Draw with a caller-provided RNG.
    pub fn assign_with_rng<'a, I, R>(ids: I, rng: &mut R) -> Self
    where
        I: IntoIterator<Item = &'a NodeId>,
        R: Rng,
    {
        Self {
            seeds: ids
                .into_iter()
                .map(|id| (id.clone(), rng.gen_range(0..=SEED_MAX)))
                .collect(),
        }
    }

    /// Seed for a node, if it belongs to the loaded graph.
    pub fn get(&self, id: &NodeId) -> Option<u32> {
        self.seeds.get(id).copied()
    }

    /// Number of seeded nodes.
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}
