//! Stake ledger for the Sylo staking protocol.
//!
//! Tracks, per node and per staker, the raw token deposit, the
//! capacity-penalized effective balance, and a time-weighted reward stake
//! for every cycle. Capacity comes from seekers staked against the node and
//! scored by a [`CapacityOracle`](sylo_types::CapacityOracle).
//!
//! Node aggregates are updated in the same step as the staker record they
//! summarize, so `node_stake` and the node's reward cycle stake always equal
//! the sum over its stakers.

pub mod additions;
pub mod error;
pub mod history;
pub mod ledger;
pub mod reclassify;
pub mod roles;

pub use additions::{AdditionQueue, StakeAddition, TimeWeight};
pub use error::StakingError;
pub use history::{CycleStake, RewardCycleHistory};
pub use ledger::{NodeLedger, StakeKey, StakeLedger, StakerLedger};
pub use reclassify::{effective_stake, reclassify, Holding, StakeAdjustment};
pub use roles::{Role, RoleRegistry};
