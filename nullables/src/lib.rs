//! Nullable infrastructure for deterministic testing.
//!
//! The ledger and directory reach the outside world through three seams:
//! the cycle clock, the capacity oracle and snapshot storage. This crate
//! provides implementations of each that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or wall-clock time
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod oracle;
pub mod store;

pub use clock::NullClock;
pub use oracle::NullCapacityOracle;
pub use store::NullSnapshotStore;
