//! Per-cycle reward stake snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use sylo_types::CycleId;

use crate::error::StakingError;

/// Reward stake recorded for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStake {
    /// Time-weighted stake credited to the cycle.
    pub credited: u128,
    /// Effective balance held when the cycle was last touched.
    pub closing: u128,
}

/// Reward stake by cycle, written only for cycles in which a mutation
/// happened. Cycles in between carry the previous closing balance forward.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCycleHistory {
    entries: BTreeMap<CycleId, CycleStake>,
}

impl RewardCycleHistory {
    pub fn latest_cycle(&self) -> Option<CycleId> {
        self.entries.keys().next_back().copied()
    }

    pub fn entry(&self, cycle: CycleId) -> Option<&CycleStake> {
        self.entries.get(&cycle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reward stake for `cycle`.
    pub fn stake_at(&self, cycle: CycleId) -> u128 {
        if let Some(entry) = self.entries.get(&cycle) {
            return entry.credited;
        }
        self.entries
            .range(..cycle)
            .next_back()
            .map(|(_, entry)| entry.closing)
            .unwrap_or(0)
    }

    /// Ensure `cycle` has an entry, opening it at the previous closing
    /// balance held for the full cycle.
    pub fn open(&mut self, cycle: CycleId) -> &mut CycleStake {
        let carried = self
            .entries
            .range(..cycle)
            .next_back()
            .map(|(_, entry)| entry.closing)
            .unwrap_or(0);
        self.entries.entry(cycle).or_insert(CycleStake {
            credited: carried,
            closing: carried,
        })
    }

    /// Add `weighted` to the cycle's credit and `amount` to its closing
    /// balance.
    pub fn credit(
        &mut self,
        cycle: CycleId,
        weighted: u128,
        amount: u128,
    ) -> Result<(), StakingError> {
        let entry = self.open(cycle);
        entry.credited = entry
            .credited
            .checked_add(weighted)
            .ok_or(StakingError::Overflow)?;
        entry.closing = entry
            .closing
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        Ok(())
    }

    pub fn debit(
        &mut self,
        cycle: CycleId,
        weighted: u128,
        amount: u128,
    ) -> Result<(), StakingError> {
        let entry = self.open(cycle);
        entry.credited = entry
            .credited
            .checked_sub(weighted)
            .ok_or(StakingError::Overflow)?;
        entry.closing = entry
            .closing
            .checked_sub(amount)
            .ok_or(StakingError::Overflow)?;
        Ok(())
    }
}
