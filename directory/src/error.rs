//! Directory errors.

use sylo_store::StoreError;
use sylo_types::{Address, CycleId, PeriodId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("node address must not be the zero address")]
    ZeroNodeAddress,

    #[error("node {0} cannot join the directory with zero stake")]
    CannotJoinDirectoryWithZeroStake(Address),

    #[error("node {node} already joined the directory for cycle {cycle} period {period}")]
    NodeAlreadyJoinedDirectory {
        node: Address,
        cycle: CycleId,
        period: PeriodId,
    },

    #[error("directory total stake overflow")]
    Overflow,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("directory snapshot serialization failed: {0}")]
    Serialization(String),
}
