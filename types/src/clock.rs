//! Protocol time: cycles subdivided into periods.
//!
//! The ledger and directory never read wall-clock time directly. They consume
//! a [`CycleClock`], which answers "where are we in the protocol schedule"
//! within a single state transition.

use serde::{Deserialize, Serialize};

use crate::error::TypesError;
use crate::time::Timestamp;

/// Reward cycle number. Cycle `0` is the pre-start interval; the first real
/// cycle is `1`.
pub type CycleId = u64;

/// Period number within a cycle, starting at `0`.
pub type PeriodId = u64;

/// Read-only view of the protocol clock.
pub trait CycleClock {
    /// Whether the first cycle has begun.
    fn has_protocol_started(&self) -> bool;

    /// The current cycle, or `0` before the protocol starts.
    fn current_cycle(&self) -> CycleId;

    /// The current period within the current cycle.
    fn current_period(&self) -> PeriodId;

    /// Length of a cycle in seconds.
    fn cycle_duration(&self) -> u64;

    /// Seconds elapsed since the current cycle began.
    fn elapsed_in_cycle(&self) -> u64;

    /// Number of periods in a cycle.
    fn periods_per_cycle(&self) -> u64;

    /// The period that directory joins made now will target.
    fn next_period(&self) -> (CycleId, PeriodId) {
        if !self.has_protocol_started() {
            return (1, 0);
        }
        let cycle = self.current_cycle();
        let period = self.current_period() + 1;
        if period >= self.periods_per_cycle() {
            (cycle + 1, 0)
        } else {
            (cycle, period)
        }
    }
}

/// A fixed schedule of equal-length cycles and periods starting at `start`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSchedule {
    pub start: Timestamp,
    pub cycle_duration: u64,
    pub period_duration: u64,
}

impl ProtocolSchedule {
    pub fn new(
        start: Timestamp,
        cycle_duration: u64,
        period_duration: u64,
    ) -> Result<Self, TypesError> {
        if cycle_duration == 0 {
            return Err(TypesError::InvalidSchedule("cycle duration is zero".into()));
        }
        if period_duration == 0 || period_duration > cycle_duration {
            return Err(TypesError::InvalidSchedule(format!(
                "period duration {period_duration} must be within 1..={cycle_duration}"
            )));
        }
        Ok(Self {
            start,
            cycle_duration,
            period_duration,
        })
    }

    pub fn periods_per_cycle(&self) -> u64 {
        self.cycle_duration.div_ceil(self.period_duration)
    }

    /// Evaluate the schedule at `now`.
    pub fn at(&self, now: Timestamp) -> ProtocolTime {
        if now < self.start {
            return ProtocolTime {
                started: false,
                cycle: 0,
                period: 0,
                elapsed: 0,
                cycle_duration: self.cycle_duration,
                periods_per_cycle: self.periods_per_cycle(),
            };
        }
        let since_start = self.start.elapsed_since(now);
        let elapsed = since_start % self.cycle_duration;
        ProtocolTime {
            started: true,
            cycle: since_start / self.cycle_duration + 1,
            period: elapsed / self.period_duration,
            elapsed,
            cycle_duration: self.cycle_duration,
            periods_per_cycle: self.periods_per_cycle(),
        }
    }
}

/// The schedule frozen at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtocolTime {
    started: bool,
    cycle: CycleId,
    period: PeriodId,
    elapsed: u64,
    cycle_duration: u64,
    periods_per_cycle: u64,
}

impl CycleClock for ProtocolTime {
    fn has_protocol_started(&self) -> bool {
        self.started
    }

    fn current_cycle(&self) -> CycleId {
        self.cycle
    }

    fn current_period(&self) -> PeriodId {
        self.period
    }

    fn cycle_duration(&self) -> u64 {
        self.cycle_duration
    }

    fn elapsed_in_cycle(&self) -> u64 {
        self.elapsed
    }

    fn periods_per_cycle(&self) -> u64 {
        self.periods_per_cycle
    }
}
