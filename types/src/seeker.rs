//! Seekers: NFT-backed attribute bundles that provide staking capacity.

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Registry identifier of a seeker.
pub type SeekerId = u64;

/// The six attribute scores of a seeker, or the running totals of several.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeekerAttributes {
    pub reactor: u64,
    pub cores: u64,
    pub durability: u64,
    pub sensors: u64,
    pub storage: u64,
    pub chip: u64,
}

impl SeekerAttributes {
    pub const ZERO: Self = Self {
        reactor: 0,
        cores: 0,
        durability: 0,
        sensors: 0,
        storage: 0,
        chip: 0,
    };

    /// Sum of all six scores.
    pub fn total(&self) -> u128 {
        [
            self.reactor,
            self.cores,
            self.durability,
            self.sensors,
            self.storage,
            self.chip,
        ]
        .iter()
        .map(|&v| v as u128)
        .sum()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self, TypesError> {
        Ok(Self {
            reactor: add(self.reactor, other.reactor)?,
            cores: add(self.cores, other.cores)?,
            durability: add(self.durability, other.durability)?,
            sensors: add(self.sensors, other.sensors)?,
            storage: add(self.storage, other.storage)?,
            chip: add(self.chip, other.chip)?,
        })
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self, TypesError> {
        Ok(Self {
            reactor: sub(self.reactor, other.reactor)?,
            cores: sub(self.cores, other.cores)?,
            durability: sub(self.durability, other.durability)?,
            sensors: sub(self.sensors, other.sensors)?,
            storage: sub(self.storage, other.storage)?,
            chip: sub(self.chip, other.chip)?,
        })
    }
}

fn add(a: u64, b: u64) -> Result<u64, TypesError> {
    a.checked_add(b).ok_or(TypesError::AttributeOverflow)
}

fn sub(a: u64, b: u64) -> Result<u64, TypesError> {
    a.checked_sub(b).ok_or(TypesError::AttributeOverflow)
}

/// A registered seeker. Immutable once minted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seeker {
    pub id: SeekerId,
    pub rank: u64,
    pub attributes: SeekerAttributes,
}

impl Seeker {
    pub fn new(id: SeekerId, rank: u64, attributes: SeekerAttributes) -> Self {
        Self {
            id,
            rank,
            attributes,
        }
    }
}
