//! Time-weighted stake addition records.
//!
//! Each credit to a staker's effective balance is recorded with the fraction
//! of the current cycle still ahead of it. A record contributes
//! `floor(unconsumed * remaining / duration)` to the cycle's reward stake, so
//! consuming from a record removes exactly the change in that floor and an
//! add followed by an equal remove leaves the snapshot untouched.

use serde::{Deserialize, Serialize};
use sylo_types::{CycleClock, CycleId};
use sylo_utils::mul_div;

use crate::error::StakingError;

/// Portion of a cycle remaining when stake was added.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWeight {
    remaining: u64,
    duration: u64,
}

impl TimeWeight {
    pub const FULL: Self = Self {
        remaining: 1,
        duration: 1,
    };

    /// `remaining / duration`, clamped to at most one.
    pub fn new(remaining: u64, duration: u64) -> Self {
        if duration == 0 || remaining >= duration {
            Self::FULL
        } else {
            Self {
                remaining,
                duration,
            }
        }
    }

    /// Weight of stake added now. Full before the protocol starts or once the
    /// cycle has run its course.
    pub fn at(clock: &dyn CycleClock) -> Self {
        if !clock.has_protocol_started() {
            return Self::FULL;
        }
        let duration = clock.cycle_duration();
        let elapsed = clock.elapsed_in_cycle();
        Self::new(duration.saturating_sub(elapsed), duration)
    }

    pub fn is_full(&self) -> bool {
        self.remaining == self.duration
    }

    /// `floor(amount * remaining / duration)`.
    pub fn apply(&self, amount: u128) -> Result<u128, StakingError> {
        mul_div(amount, self.remaining as u128, self.duration as u128).ok_or(StakingError::Overflow)
    }
}

/// One credit to a staker's effective balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeAddition {
    pub amount: u128,
    pub consumed: u128,
    pub weight: TimeWeight,
}

impl StakeAddition {
    pub fn new(amount: u128, weight: TimeWeight) -> Self {
        Self {
            amount,
            consumed: 0,
            weight,
        }
    }

    pub fn unconsumed(&self) -> u128 {
        self.amount - self.consumed
    }

    /// What this record currently contributes to the live cycle's snapshot.
    pub fn credited(&self) -> Result<u128, StakingError> {
        self.weight.apply(self.unconsumed())
    }
}

/// A staker's additions for the cycle it last mutated in, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionQueue {
    cycle: CycleId,
    records: Vec<StakeAddition>,
}

impl AdditionQueue {
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    pub fn records(&self) -> &[StakeAddition] {
        &self.records
    }

    /// Total amount not yet consumed.
    pub fn unconsumed(&self) -> u128 {
        self.records.iter().map(StakeAddition::unconsumed).sum()
    }

    /// Move the queue into `cycle`. Leftover stake from an earlier cycle
    /// collapses into a single full-weight record, since it was held for the
    /// whole of the new cycle so far.
    pub fn roll_to(&mut self, cycle: CycleId) {
        if cycle == self.cycle {
            return;
        }
        let carried = self.unconsumed();
        self.records.clear();
        if carried > 0 {
            self.records.push(StakeAddition::new(carried, TimeWeight::FULL));
        }
        self.cycle = cycle;
    }

    /// Append a record and return the credit it contributes.
    pub fn push(&mut self, amount: u128, weight: TimeWeight) -> Result<u128, StakingError> {
        let record = StakeAddition::new(amount, weight);
        let credit = record.credited()?;
        self.records.push(record);
        Ok(credit)
    }

    /// Consume `amount` starting from the most recent record and return the
    /// credit removed from the live snapshot.
    pub fn consume(&mut self, amount: u128) -> Result<u128, StakingError> {
        let available = self.unconsumed();
        if amount > available {
            return Err(StakingError::InsufficientStake {
                requested: amount,
                available,
            });
        }

        let mut left = amount;
        let mut debit = 0u128;
        for record in self.records.iter_mut().rev() {
            if left == 0 {
                break;
            }
            let take = left.min(record.unconsumed());
            if take == 0 {
                continue;
            }
            let before = record.credited()?;
            record.consumed += take;
            let after = record.credited()?;
            debit = debit
                .checked_add(before - after)
                .ok_or(StakingError::Overflow)?;
            left -= take;
        }
        Ok(debit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(elapsed: u64) -> TimeWeight {
        TimeWeight::new(1_000 - elapsed, 1_000)
    }

    #[test]
    fn weight_is_clamped_to_full() {
        assert_eq!(TimeWeight::new(5, 0), TimeWeight::FULL);
        assert_eq!(TimeWeight::new(2_000, 1_000), TimeWeight::FULL);
        assert!(TimeWeight::new(1_000, 1_000).is_full());
    }

    #[test]
    fn weight_scales_amount() {
        assert_eq!(weight(500).apply(100).unwrap(), 50);
        assert_eq!(weight(250).apply(100).unwrap(), 75);
        assert_eq!(weight(999).apply(100).unwrap(), 0);
    }

    #[test]
    fn consume_takes_latest_records_first() {
        let mut queue = AdditionQueue::default();
        assert_eq!(queue.push(100, weight(0)).unwrap(), 100);
        assert_eq!(queue.push(100, weight(200)).unwrap(), 80);

        assert_eq!(queue.consume(80).unwrap(), 64);
        assert_eq!(queue.records()[0].unconsumed(), 100);
        assert_eq!(queue.records()[1].unconsumed(), 20);

        assert_eq!(queue.consume(25).unwrap(), 16 + 5);
        assert_eq!(queue.records()[0].unconsumed(), 95);
        assert_eq!(queue.records()[1].unconsumed(), 0);
    }

    #[test]
    fn consume_undoes_push_exactly() {
        let mut queue = AdditionQueue::default();
        queue.push(7, weight(0)).unwrap();
        let credit = queue.push(13, weight(333)).unwrap();
        assert_eq!(queue.consume(13).unwrap(), credit);
    }

    #[test]
    fn consume_beyond_unconsumed_fails_without_change() {
        let mut queue = AdditionQueue::default();
        queue.push(10, weight(0)).unwrap();
        let before = queue.clone();
        assert!(matches!(
            queue.consume(11),
            Err(StakingError::InsufficientStake {
                requested: 11,
                available: 10
            })
        ));
        assert_eq!(queue, before);
    }

    #[test]
    fn roll_to_folds_into_full_weight_record() {
        let mut queue = AdditionQueue::default();
        queue.roll_to(1);
        queue.push(100, weight(500)).unwrap();
        queue.push(50, weight(900)).unwrap();
        queue.consume(20).unwrap();

        queue.roll_to(2);
        assert_eq!(queue.cycle(), 2);
        assert_eq!(queue.records().len(), 1);
        assert_eq!(queue.records()[0].unconsumed(), 130);
        assert!(queue.records()[0].weight.is_full());
    }

    #[test]
    fn roll_to_same_cycle_keeps_records() {
        let mut queue = AdditionQueue::default();
        queue.roll_to(3);
        queue.push(1, weight(10)).unwrap();
        queue.push(2, weight(20)).unwrap();
        queue.roll_to(3);
        assert_eq!(queue.records().len(), 2);
    }

    #[test]
    fn empty_queue_rolls_to_empty() {
        let mut queue = AdditionQueue::default();
        queue.roll_to(4);
        assert!(queue.records().is_empty());
    }
}
