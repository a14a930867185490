//! Nullable clock: deterministic protocol time for testing.

use std::cell::Cell;
use sylo_types::{
    CycleClock, CycleId, PeriodId, ProtocolSchedule, ProtocolTime, Timestamp, TypesError,
};

/// Arbitrary wall-clock origin, far enough from zero that a protocol can be
/// scheduled to start "in the past".
const ORIGIN: u64 = 1_000_000;

/// A deterministic cycle clock.
///
/// Time only advances when you tell it to; every read evaluates the
/// schedule at the current instant.
pub struct NullClock {
    schedule: ProtocolSchedule,
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(schedule: ProtocolSchedule, initial_secs: u64) -> Self {
        Self {
            schedule,
            current: Cell::new(initial_secs),
        }
    }

    /// A clock sitting on the first instant of cycle 1.
    pub fn started(cycle_duration: u64, period_duration: u64) -> Result<Self, TypesError> {
        let schedule =
            ProtocolSchedule::new(Timestamp::new(ORIGIN), cycle_duration, period_duration)?;
        Ok(Self::new(schedule, ORIGIN))
    }

    /// A clock whose protocol starts `start_in` seconds from now.
    pub fn starting_in(
        start_in: u64,
        cycle_duration: u64,
        period_duration: u64,
    ) -> Result<Self, TypesError> {
        let schedule = ProtocolSchedule::new(
            Timestamp::new(ORIGIN + start_in),
            cycle_duration,
            period_duration,
        )?;
        Ok(Self::new(schedule, ORIGIN))
    }

    pub fn schedule(&self) -> &ProtocolSchedule {
        &self.schedule
    }

    /// Get the current time.
    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get() + secs);
    }

    /// Set the time to a specific value.
    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }

    /// Set the time relative to the protocol start.
    pub fn set_time_since_start(&self, secs: u64) {
        self.current.set(self.schedule.start.as_secs() + secs);
    }

    /// Jump to the first instant of `cycle`, period `period`.
    pub fn set_cycle(&self, cycle: CycleId, period: PeriodId) {
        let cycles_done = cycle.saturating_sub(1);
        self.set_time_since_start(
            cycles_done * self.schedule.cycle_duration + period * self.schedule.period_duration,
        );
    }

    /// The schedule frozen at the current instant.
    pub fn snapshot(&self) -> ProtocolTime {
        self.schedule.at(self.now())
    }
}

impl CycleClock for NullClock {
    fn has_protocol_started(&self) -> bool {
        self.snapshot().has_protocol_started()
    }

    fn current_cycle(&self) -> CycleId {
        self.snapshot().current_cycle()
    }

    fn current_period(&self) -> PeriodId {
        self.snapshot().current_period()
    }

    fn cycle_duration(&self) -> u64 {
        self.schedule.cycle_duration
    }

    fn elapsed_in_cycle(&self) -> u64 {
        self.snapshot().elapsed_in_cycle()
    }

    fn periods_per_cycle(&self) -> u64 {
        self.schedule.periods_per_cycle()
    }
}
