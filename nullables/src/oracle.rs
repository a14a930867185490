//! Nullable capacity oracle: an in-memory seeker registry that mints seekers
//! on demand.

use std::collections::HashMap;
use sylo_types::{CapacityOracle, Seeker, SeekerAttributes, SeekerId};

/// A seeker registry that scores coverage as the plain attribute total.
pub struct NullCapacityOracle {
    seekers: HashMap<SeekerId, Seeker>,
    next_id: SeekerId,
}

impl NullCapacityOracle {
    pub fn new() -> Self {
        Self {
            seekers: HashMap::new(),
            next_id: 1,
        }
    }

    /// Mint a seeker with the next id.
    pub fn register(&mut self, rank: u64, attributes: SeekerAttributes) -> Seeker {
        let seeker = Seeker::new(self.next_id, rank, attributes);
        self.next_id += 1;
        self.seekers.insert(seeker.id, seeker.clone());
        seeker
    }

    /// Mint a seeker whose six attributes all equal `score`.
    pub fn register_uniform(&mut self, rank: u64, score: u64) -> Seeker {
        self.register(
            rank,
            SeekerAttributes {
                reactor: score,
                cores: score,
                durability: score,
                sensors: score,
                storage: score,
                chip: score,
            },
        )
    }
}

impl Default for NullCapacityOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl CapacityOracle for NullCapacityOracle {
    fn seeker(&self, id: SeekerId) -> Option<Seeker> {
        self.seekers.get(&id).cloned()
    }

    fn coverage(&self, totals: &SeekerAttributes) -> u128 {
        totals.total()
    }
}
