//! Fundamental types for the Sylo staking protocol.
//!
//! This crate defines the types shared across every other crate in the
//! workspace: addresses, timestamps, seekers, the staking parameters, and
//! the two collaborator seams: the cycle clock and the capacity oracle.

pub mod address;
pub mod clock;
pub mod error;
pub mod oracle;
pub mod params;
pub mod seeker;
pub mod time;

pub use address::Address;
pub use clock::{CycleClock, CycleId, PeriodId, ProtocolSchedule, ProtocolTime};
pub use error::TypesError;
pub use oracle::CapacityOracle;
pub use params::StakingParams;
pub use seeker::{Seeker, SeekerAttributes, SeekerId};
pub use time::Timestamp;
