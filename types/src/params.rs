//! Administratively tunable staking parameters.

use serde::{Deserialize, Serialize};

/// Parameters that shape how staking capacity is derived and enforced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    /// Node capacity per point of attribute coverage reported by the oracle.
    #[serde(default = "default_capacity_coverage_multiplier")]
    pub capacity_coverage_multiplier: u128,

    /// Divisor applied to token stake held in excess of capacity.
    /// A factor of 4 makes uncovered stake count a quarter of its face value.
    #[serde(default = "default_capacity_penalty_factor")]
    pub capacity_penalty_factor: u128,
}

fn default_capacity_coverage_multiplier() -> u128 {
    1_000
}

fn default_capacity_penalty_factor() -> u128 {
    4
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            capacity_coverage_multiplier: default_capacity_coverage_multiplier(),
            capacity_penalty_factor: default_capacity_penalty_factor(),
        }
    }
}
