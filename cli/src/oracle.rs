//! The capacity oracle the CLI runs against: the seekers listed in the
//! config file, scored at a fixed coverage per attribute point.

use std::collections::BTreeMap;
use sylo_types::{CapacityOracle, Seeker, SeekerAttributes, SeekerId};
use tracing::warn;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfiguredOracle {
    seekers: BTreeMap<SeekerId, Seeker>,
    coverage_per_point: u128,
}

impl ConfiguredOracle {
    /// A later entry with an id already seen replaces the earlier one.
    pub fn new<'a>(seekers: impl IntoIterator<Item = &'a Seeker>, coverage_per_point: u128) -> Self {
        let mut registry = BTreeMap::new();
        for seeker in seekers {
            if registry.insert(seeker.id, seeker.clone()).is_some() {
                warn!(seeker = seeker.id, "seeker listed twice in config, keeping the last entry");
            }
        }
        Self {
            seekers: registry,
            coverage_per_point,
        }
    }

    pub fn len(&self) -> usize {
        self.seekers.len()
    }
}

impl CapacityOracle for ConfiguredOracle {
    fn seeker(&self, id: SeekerId) -> Option<Seeker> {
        self.seekers.get(&id).cloned()
    }

    fn coverage(&self, totals: &SeekerAttributes) -> u128 {
        totals.total().saturating_mul(self.coverage_per_point)
    }
}
