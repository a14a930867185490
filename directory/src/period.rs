//! The joined node set of one (cycle, period).

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use sylo_types::Address;
use sylo_utils::{point_to_weight, weight_to_point};

use crate::error::DirectoryError;
use crate::fenwick::WeightTree;

/// One node's slice of a period's point space.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub node: Address,
    pub stake: u128,
    /// Stake of this entry and every entry before it.
    pub cumulative_stake: u128,
    /// First point of the `[0, 2^128)` space mapped to this node.
    pub range_start: u128,
    /// Last point mapped to this node, inclusive.
    pub range_end: u128,
}

/// Weighted nodes for one period, in first-join order within the cycle.
///
/// A period starts as a copy of the latest earlier period of its cycle, so
/// nodes that do not rejoin keep their last weight.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDirectory {
    nodes: Vec<Address>,
    positions: HashMap<Address, usize>,
    tree: WeightTree,
    /// Nodes whose join targeted this exact period.
    joined: HashSet<Address>,
}

impl PeriodDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of `self` to seed a later period of the same cycle.
    pub fn inherit(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            positions: self.positions.clone(),
            tree: self.tree.clone(),
            joined: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn total_stake(&self) -> u128 {
        self.tree.total()
    }

    pub fn has_joined(&self, node: &Address) -> bool {
        self.joined.contains(node)
    }

    pub fn stake_of(&self, node: &Address) -> u128 {
        self.positions
            .get(node)
            .and_then(|&i| self.tree.weight(i))
            .unwrap_or(0)
    }

    /// Record `node` joining this period with `stake`, replacing any weight
    /// it inherited.
    pub fn join(&mut self, node: Address, stake: u128) -> Result<(), DirectoryError> {
        let total = self.tree.total();
        match self.positions.get(&node).copied() {
            Some(index) => {
                let old = self.tree.weight(index).unwrap_or(0);
                (total - old)
                    .checked_add(stake)
                    .ok_or(DirectoryError::Overflow)?;
                self.tree.set(index, stake);
            }
            None => {
                total.checked_add(stake).ok_or(DirectoryError::Overflow)?;
                let index = self.tree.push(stake);
                self.nodes.push(node);
                self.positions.insert(node, index);
            }
        }
        self.joined.insert(node);
        Ok(())
    }

    /// The node whose range contains `point`, or the zero address when the
    /// period carries no stake.
    pub fn scan(&self, point: u128) -> Address {
        let total = self.tree.total();
        if total == 0 {
            return Address::ZERO;
        }
        self.tree
            .find(point_to_weight(point, total))
            .and_then(|i| self.nodes.get(i).copied())
            .unwrap_or(Address::ZERO)
    }

    pub fn entries(&self) -> Vec<DirectoryEntry> {
        let total = self.tree.total();
        let mut cumulative = 0u128;
        self.nodes
            .iter()
            .zip(self.tree.weights())
            .map(|(&node, &stake)| {
                let before = cumulative;
                cumulative += stake;
                DirectoryEntry {
                    node,
                    stake,
                    cumulative_stake: cumulative,
                    range_start: weight_to_point(before, total).unwrap_or(u128::MAX),
                    range_end: weight_to_point(cumulative, total)
                        .map(|p| p - 1)
                        .unwrap_or(u128::MAX),
                }
            })
            .collect()
    }
}
