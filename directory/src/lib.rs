//! Weighted directory for the Sylo staking protocol.
//!
//! Nodes join the directory for the next period with their current stake.
//! A scan maps a uniformly distributed 128-bit point to the node whose
//! proportional slice of `[0, 2^128)` contains it, using a Fenwick tree so
//! each lookup is `O(log n)` in the number of joined nodes.

pub mod directory;
pub mod error;
pub mod fenwick;
pub mod period;

pub use directory::Directory;
pub use error::DirectoryError;
pub use fenwick::WeightTree;
pub use period::{DirectoryEntry, PeriodDirectory};

use std::collections::HashMap;
use sylo_staking::StakeLedger;
use sylo_types::Address;

/// Where the directory reads a node's stake at join time.
pub trait StakeSource {
    fn node_stake(&self, node: &Address) -> u128;
}

impl StakeSource for StakeLedger {
    fn node_stake(&self, node: &Address) -> u128 {
        StakeLedger::node_stake(self, node)
    }
}

impl StakeSource for HashMap<Address, u128> {
    fn node_stake(&self, node: &Address) -> u128 {
        self.get(node).copied().unwrap_or(0)
    }
}
