//! Storage traits for the Sylo staking protocol.
//!
//! The stake ledger and directory own their state in memory and persist
//! whole-component snapshots through [`SnapshotStore`]. Backends (files on
//! disk, in-memory for testing) implement the trait; the rest of the
//! codebase depends only on it.

pub mod error;
pub mod file;
pub mod snapshot;

pub use error::StoreError;
pub use file::FileSnapshotStore;
pub use snapshot::{SnapshotKind, SnapshotStore};
