//! Capacity penalties on token stake.
//!
//! A staker's balance is split into stake counted at full value, which never
//! exceeds the capacity share it was last fitted to, and stake held beyond
//! capacity, which counts for its raw amount divided by the penalty factor.
//! Deposits are split once, when they arrive ([`effective_stake`]);
//! capacity changes move stake between the two parts ([`reclassify`]).

use serde::{Deserialize, Serialize};
use sylo_utils::mul_div;

use crate::error::StakingError;

/// What a deposit of `amount` counts for when `available` capacity is left:
/// `min(amount, available) + (amount - min(amount, available)) / penalty_factor`.
///
/// A zero penalty factor is treated as "uncovered stake counts for nothing".
pub fn effective_stake(amount: u128, available: u128, penalty_factor: u128) -> u128 {
    let covered = amount.min(available);
    let excess = amount - covered;
    covered + excess.checked_div(penalty_factor).unwrap_or(0)
}

/// How one staker's balance splits between covered and penalized stake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// Stake counted at full value.
    pub unpenalized: u128,
    /// Raw tokens held beyond capacity.
    pub excess: u128,
    /// What `excess` counts for after the penalty. Never more than `excess`.
    pub penalized: u128,
}

impl Holding {
    /// The effective balance.
    pub fn balance(&self) -> u128 {
        self.unpenalized.saturating_add(self.penalized)
    }

    /// Raw tokens behind the balance.
    pub fn deposit(&self) -> u128 {
        self.unpenalized.saturating_add(self.excess)
    }

    /// Capacity left for full-value stake under `share`.
    pub fn available(&self, share: u128) -> u128 {
        share.saturating_sub(self.unpenalized)
    }

    /// Take in a deposit of `amount` against `share`, returning the
    /// effective amount it adds to the balance.
    pub fn deposit_tokens(
        &mut self,
        amount: u128,
        share: u128,
        penalty_factor: u128,
    ) -> Result<u128, StakingError> {
        let available = self.available(share);
        let covered = amount.min(available);
        let effective = effective_stake(amount, available, penalty_factor);
        // the raw deposit bounds every field, so checking it covers the rest
        self.unpenalized
            .checked_add(self.excess)
            .and_then(|raw| raw.checked_add(amount))
            .ok_or(StakingError::Overflow)?;
        self.unpenalized += covered;
        self.excess += amount - covered;
        self.penalized += effective - covered;
        Ok(effective)
    }

    /// Take `amount` off the balance, drawing on penalized stake first.
    /// Once penalized stake is used up the excess behind it goes too, so
    /// nothing is left over for a later promotion to credit back.
    pub fn withdraw(&mut self, amount: u128) -> Result<(), StakingError> {
        let balance = self.balance();
        if amount > balance {
            return Err(StakingError::InsufficientStake {
                requested: amount,
                available: balance,
            });
        }
        if amount == 0 {
            return Ok(());
        }
        let from_penalized = amount.min(self.penalized);
        let released = if from_penalized == self.penalized {
            self.excess
        } else {
            mul_div(self.excess, from_penalized, self.penalized).ok_or(StakingError::Overflow)?
        };
        self.penalized -= from_penalized;
        self.excess -= released;
        self.unpenalized -= amount - from_penalized;
        Ok(())
    }
}

/// Change to an effective balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeAdjustment {
    Credit(u128),
    Debit(u128),
    Unchanged,
}

impl StakeAdjustment {
    /// The adjustment that moves a balance from `before` to `after`.
    pub fn between(before: u128, after: u128) -> Self {
        match after.cmp(&before) {
            std::cmp::Ordering::Greater => StakeAdjustment::Credit(after - before),
            std::cmp::Ordering::Less => StakeAdjustment::Debit(before - after),
            std::cmp::Ordering::Equal => StakeAdjustment::Unchanged,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, StakeAdjustment::Unchanged)
    }
}

/// Refit `holding` to a new capacity `share`.
///
/// Covered stake above the share is demoted to penalized stake. Spare share
/// promotes penalized tokens back to full value, releasing the penalized
/// amount they stood for in proportion. The raw deposit never changes.
pub fn reclassify(
    holding: &Holding,
    share: u128,
    penalty_factor: u128,
) -> Result<(Holding, StakeAdjustment), StakingError> {
    let mut next = *holding;
    if holding.unpenalized > share {
        let demoted = holding.unpenalized - share;
        let kept = effective_stake(demoted, 0, penalty_factor);
        next.unpenalized = share;
        next.excess = holding.excess.checked_add(demoted).ok_or(StakingError::Overflow)?;
        next.penalized = holding.penalized.checked_add(kept).ok_or(StakingError::Overflow)?;
    } else {
        let promoted = holding.available(share).min(holding.excess);
        if promoted > 0 {
            let released = if promoted == holding.excess {
                holding.penalized
            } else {
                mul_div(holding.penalized, promoted, holding.excess).ok_or(StakingError::Overflow)?
            };
            next.unpenalized += promoted;
            next.excess -= promoted;
            next.penalized -= released;
        }
    }
    let adjustment = StakeAdjustment::between(holding.balance(), next.balance());
    Ok((next, adjustment))
}
