//! Stake ledger errors.

use sylo_store::StoreError;
use sylo_types::{Address, SeekerId, TypesError};
use thiserror::Error;

use crate::roles::Role;

#[derive(Debug, Error)]
pub enum StakingError {
    #[error("node address must not be the zero address")]
    ZeroNodeAddress,

    #[error("staker address must not be the zero address")]
    ZeroStakerAddress,

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("insufficient stake: requested {requested}, available {available}")]
    InsufficientStake { requested: u128, available: u128 },

    #[error("seeker {0} is not registered with the capacity oracle")]
    SeekerNotRegistered(SeekerId),

    #[error("seeker {0} is already staked")]
    SeekerAlreadyStaked(SeekerId),

    #[error("seeker {0} is not staked by this node and staker")]
    SeekerNotStaked(SeekerId),

    #[error("{caller} does not hold the {role} role")]
    Unauthorized { caller: Address, role: Role },

    #[error("capacity penalty factor must be non-zero")]
    ZeroPenaltyFactor,

    #[error("arithmetic overflow in stake computation")]
    Overflow,

    #[error(transparent)]
    Types(#[from] TypesError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("ledger snapshot serialization failed: {0}")]
    Serialization(String),
}
