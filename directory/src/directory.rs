//! The weighted directory: per-cycle, per-period node weights and scans.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use sylo_store::{SnapshotKind, SnapshotStore};
use sylo_types::{Address, CycleClock, CycleId, PeriodId};
use tracing::debug;

use crate::error::DirectoryError;
use crate::period::{DirectoryEntry, PeriodDirectory};
use crate::StakeSource;

/// Node weights by cycle and period.
///
/// Only periods that received a join are stored. A lookup for any other
/// period of a cycle resolves to the latest stored period at or before it;
/// nothing carries across a cycle boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    cycles: HashMap<CycleId, BTreeMap<PeriodId, PeriodDirectory>>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join `node` to the period after the current one with its current
    /// stake, returning the targeted (cycle, period).
    pub fn join_next_directory(
        &mut self,
        clock: &dyn CycleClock,
        stakes: &dyn StakeSource,
        node: &Address,
    ) -> Result<(CycleId, PeriodId), DirectoryError> {
        if node.is_zero() {
            return Err(DirectoryError::ZeroNodeAddress);
        }
        let (cycle, period) = clock.next_period();
        let stake = stakes.node_stake(node);
        if stake == 0 {
            return Err(DirectoryError::CannotJoinDirectoryWithZeroStake(*node));
        }

        let periods = self.cycles.get(&cycle);
        if periods
            .and_then(|p| p.get(&period))
            .is_some_and(|dir| dir.has_joined(node))
        {
            return Err(DirectoryError::NodeAlreadyJoinedDirectory {
                node: *node,
                cycle,
                period,
            });
        }

        match self
            .cycles
            .get_mut(&cycle)
            .and_then(|p| p.get_mut(&period))
        {
            Some(dir) => dir.join(*node, stake)?,
            None => {
                let mut dir = self
                    .resolve(cycle, period)
                    .map(PeriodDirectory::inherit)
                    .unwrap_or_default();
                dir.join(*node, stake)?;
                self.cycles.entry(cycle).or_default().insert(period, dir);
            }
        }

        debug!(node = %node, stake, cycle, period, "joined directory");
        Ok((cycle, period))
    }

    /// Scan the period the clock is in.
    pub fn scan(&self, clock: &dyn CycleClock, point: u128) -> Address {
        self.scan_with_time(point, clock.current_cycle(), clock.current_period())
    }

    /// The node whose range contains `point` in (cycle, period), or the zero
    /// address if no node joined that cycle by that period.
    pub fn scan_with_time(&self, point: u128, cycle: CycleId, period: PeriodId) -> Address {
        self.resolve(cycle, period)
            .map_or(Address::ZERO, |dir| dir.scan(point))
    }

    /// `node`'s weight as of (cycle, period), or zero.
    pub fn directory_stake(&self, cycle: CycleId, period: PeriodId, node: &Address) -> u128 {
        self.resolve(cycle, period)
            .map_or(0, |dir| dir.stake_of(node))
    }

    pub fn total_stake(&self, cycle: CycleId, period: PeriodId) -> u128 {
        self.resolve(cycle, period)
            .map_or(0, PeriodDirectory::total_stake)
    }

    /// Every effective entry of (cycle, period) with its point range.
    pub fn entries(&self, cycle: CycleId, period: PeriodId) -> Vec<DirectoryEntry> {
        self.resolve(cycle, period)
            .map(PeriodDirectory::entries)
            .unwrap_or_default()
    }

    /// Periods of `cycle` that received at least one join.
    pub fn joined_periods(&self, cycle: CycleId) -> Vec<PeriodId> {
        self.cycles
            .get(&cycle)
            .map(|periods| periods.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Latest stored period of `cycle` at or before `period`.
    fn resolve(&self, cycle: CycleId, period: PeriodId) -> Option<&PeriodDirectory> {
        self.cycles
            .get(&cycle)?
            .range(..=period)
            .next_back()
            .map(|(_, dir)| dir)
    }
}

impl Directory {
    /// Persist the whole directory as one snapshot.
    pub fn save_to_store(&self, store: &dyn SnapshotStore) -> Result<(), DirectoryError> {
        let bytes =
            bincode::serialize(self).map_err(|e| DirectoryError::Serialization(e.to_string()))?;
        store.put_snapshot(SnapshotKind::Directory, &bytes)?;
        Ok(())
    }

    /// Restore a directory, or an empty one if none was saved.
    pub fn load_from_store(store: &dyn SnapshotStore) -> Result<Self, DirectoryError> {
        match store.get_snapshot(SnapshotKind::Directory)? {
            Some(bytes) => bincode::deserialize(&bytes)
                .map_err(|e| DirectoryError::Serialization(e.to_string())),
            None => Ok(Self::new()),
        }
    }
}
