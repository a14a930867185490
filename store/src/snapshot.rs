//! Snapshot storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which component a snapshot belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotKind {
    StakeLedger,
    Directory,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 2] = [SnapshotKind::StakeLedger, SnapshotKind::Directory];

    /// Stable key used by backends.
    pub fn key(&self) -> &'static str {
        match self {
            SnapshotKind::StakeLedger => "stake_ledger",
            SnapshotKind::Directory => "directory",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Persistent storage for component snapshots.
///
/// Uses opaque bytes so the store doesn't depend on the staking or directory
/// crates; each component serializes its own state.
pub trait SnapshotStore {
    /// Fetch the latest snapshot, if one was ever written.
    fn get_snapshot(&self, kind: SnapshotKind) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the snapshot. A failed write leaves the previous one intact.
    fn put_snapshot(&self, kind: SnapshotKind, bytes: &[u8]) -> Result<(), StoreError>;

    /// Remove the snapshot. Removing a missing snapshot is not an error.
    fn delete_snapshot(&self, kind: SnapshotKind) -> Result<(), StoreError>;
}
