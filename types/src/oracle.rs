//! The capacity oracle seam.

use crate::seeker::{Seeker, SeekerAttributes, SeekerId};

/// Scores seeker attributes into staking coverage.
///
/// Backed by an external registry in production; the ledger only needs to
/// look seekers up and score the running attribute totals of a node.
pub trait CapacityOracle {
    /// A registered seeker, or `None` if the id was never minted.
    fn seeker(&self, id: SeekerId) -> Option<Seeker>;

    /// Coverage score for the combined attributes of every seeker staked
    /// against a node.
    fn coverage(&self, totals: &SeekerAttributes) -> u128;
}
