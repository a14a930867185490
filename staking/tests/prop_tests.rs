use proptest::prelude::*;

use sylo_nullables::{NullCapacityOracle, NullClock};
use sylo_staking::{effective_stake, StakeAdjustment, StakeLedger, StakingError};
use sylo_types::{Address, CycleClock, StakingParams};

const CYCLE: u64 = 1_000;

fn admin() -> Address {
    Address::from_low_u64(1)
}

fn node() -> Address {
    Address::from_low_u64(100)
}

fn ledger() -> StakeLedger {
    StakeLedger::new(admin(), StakingParams::default()).unwrap()
}

#[derive(Clone, Debug)]
enum Op {
    Add { staker: u64, amount: u128 },
    Remove { staker: u64, amount: u128 },
    StakeSeeker { staker: u64 },
    UnstakeSeeker { staker: u64 },
    Advance(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (2u64..6, 1u128..10_000).prop_map(|(staker, amount)| Op::Add { staker, amount }),
        3 => (2u64..6, 1u128..10_000).prop_map(|(staker, amount)| Op::Remove { staker, amount }),
        1 => (2u64..6).prop_map(|staker| Op::StakeSeeker { staker }),
        1 => (2u64..6).prop_map(|staker| Op::UnstakeSeeker { staker }),
        2 => (1u64..700).prop_map(Op::Advance),
    ]
}

proptest! {
    /// Node reward stake equals the sum over its stakers in every cycle,
    /// and node stake equals the sum of effective user stakes.
    #[test]
    fn node_aggregates_match_staker_sums(ops in proptest::collection::vec(op(), 1..60)) {
        let clock = NullClock::started(CYCLE, 100).unwrap();
        let mut oracle = NullCapacityOracle::new();
        let mut ledger = ledger();

        for op in ops {
            match op {
                Op::Add { staker, amount } => {
                    let s = Address::from_low_u64(staker);
                    ledger.add_token_stake(&clock, &admin(), &node(), &s, amount).unwrap();
                }
                Op::Remove { staker, amount } => {
                    let s = Address::from_low_u64(staker);
                    let balance = ledger.user_stake(&node(), &s);
                    let result = ledger.remove_token_stake(&clock, &admin(), &node(), &s, amount);
                    if amount > balance {
                        let rejected = matches!(result, Err(StakingError::InsufficientStake { .. }));
                        prop_assert!(rejected);
                    } else {
                        prop_assert!(result.is_ok());
                    }
                }
                Op::StakeSeeker { staker } => {
                    let s = Address::from_low_u64(staker);
                    let seeker = oracle.register_uniform(1 + staker, 3);
                    ledger.add_seeker_stake(&clock, &oracle, &admin(), &node(), &s, seeker.id).unwrap();
                }
                Op::UnstakeSeeker { staker } => {
                    let s = Address::from_low_u64(staker);
                    if let Some(id) = ledger.staked_seekers(&node(), &s).first().copied() {
                        ledger.remove_seeker_stake(&clock, &oracle, &admin(), &node(), &s, id).unwrap();
                    }
                }
                Op::Advance(secs) => clock.advance(secs),
            }
        }

        let stakers = ledger.stakers_of(&node());
        let summed: u128 = stakers.iter().map(|s| ledger.user_stake(&node(), s)).sum();
        prop_assert_eq!(ledger.node_stake(&node()), summed);

        for cycle in 0..=clock.current_cycle() + 1 {
            let by_users: u128 = stakers
                .iter()
                .map(|s| ledger.reward_cycle_stake_by_user(cycle, &node(), s))
                .sum();
            prop_assert_eq!(ledger.reward_cycle_stake_by_node(cycle, &node()), by_users);
        }
    }

    /// A rejected removal leaves every balance untouched.
    #[test]
    fn over_removal_is_rejected_without_effect(
        deposit in 1u128..1_000_000,
        excess in 1u128..1_000_000,
        elapsed in 0u64..CYCLE,
    ) {
        let clock = NullClock::started(CYCLE, 100).unwrap();
        let staker = Address::from_low_u64(2);
        let mut ledger = ledger();
        ledger.add_token_stake(&clock, &admin(), &node(), &staker, deposit).unwrap();
        clock.advance(elapsed);

        let before = ledger.clone();
        let balance = ledger.user_stake(&node(), &staker);
        let result = ledger.remove_token_stake(&clock, &admin(), &node(), &staker, balance + excess);
        let rejected = matches!(result, Err(StakingError::InsufficientStake { .. }));
        prop_assert!(rejected);
        prop_assert_eq!(ledger, before);
    }

    /// Stake added at elapsed `t` credits `A * (D - t) / D`.
    #[test]
    fn addition_credit_decays_linearly(
        amount in 1u128..1_000_000_000,
        elapsed in 0u64..CYCLE,
    ) {
        let clock = NullClock::started(CYCLE, 100).unwrap();
        let staker = Address::from_low_u64(2);
        let mut ledger = ledger();
        ledger.set_capacity_coverage_multiplier(&admin(), u128::MAX).unwrap();
        let mut oracle = NullCapacityOracle::new();
        let seeker = oracle.register_uniform(1, 1);
        ledger.add_seeker_stake(&clock, &oracle, &admin(), &node(), &staker, seeker.id).unwrap();

        clock.advance(elapsed);
        ledger.add_token_stake(&clock, &admin(), &node(), &staker, amount).unwrap();

        let expected = amount * (CYCLE - elapsed) as u128 / CYCLE as u128;
        prop_assert_eq!(ledger.reward_cycle_stake_by_user(1, &node(), &staker), expected);
        prop_assert_eq!(ledger.user_stake(&node(), &staker), amount);
    }

    /// Adding stake and then removing what it credited restores the reward
    /// stake exactly.
    #[test]
    fn add_then_remove_restores_reward_stake(
        base in 1u128..1_000_000,
        amount in 1u128..1_000_000,
        t1 in 0u64..CYCLE,
        t2 in 0u64..CYCLE,
    ) {
        let clock = NullClock::started(CYCLE, 100).unwrap();
        let staker = Address::from_low_u64(2);
        let mut ledger = ledger();
        let (first, second) = (t1.min(t2), t1.max(t2));

        clock.advance(first);
        ledger.add_token_stake(&clock, &admin(), &node(), &staker, base).unwrap();
        let rc = ledger.reward_cycle_stake_by_user(1, &node(), &staker);
        let stake = ledger.user_stake(&node(), &staker);

        clock.advance(second - first);
        let added = ledger.add_token_stake(&clock, &admin(), &node(), &staker, amount).unwrap();
        if let StakeAdjustment::Credit(credited) = added {
            ledger.remove_token_stake(&clock, &admin(), &node(), &staker, credited).unwrap();
        }

        prop_assert_eq!(ledger.user_stake(&node(), &staker), stake);
        prop_assert_eq!(ledger.reward_cycle_stake_by_user(1, &node(), &staker), rc);
    }

    /// Effective stake never exceeds the amount deposited and never falls
    /// below the covered part.
    #[test]
    fn effective_stake_is_bounded(
        amount in 0u128..u64::MAX as u128,
        available in 0u128..u64::MAX as u128,
        penalty in 1u128..100,
    ) {
        let effective = effective_stake(amount, available, penalty);
        prop_assert!(effective <= amount);
        prop_assert!(effective >= amount.min(available));
    }

    /// At a fixed capacity every deposit is credited on its own amount and
    /// every withdrawal takes exactly what it asks for.
    #[test]
    fn deposits_and_withdrawals_at_fixed_capacity(
        seekers in 0u64..3,
        ops in proptest::collection::vec((any::<bool>(), 1u128..200_000), 1..40),
    ) {
        let clock = NullClock::started(CYCLE, 100).unwrap();
        let staker = Address::from_low_u64(2);
        let penalty = StakingParams::default().capacity_penalty_factor;
        let mut oracle = NullCapacityOracle::new();
        let mut ledger = ledger();
        for _ in 0..seekers {
            let seeker = oracle.register_uniform(1, 1);
            ledger.add_seeker_stake(&clock, &oracle, &admin(), &node(), &staker, seeker.id).unwrap();
        }
        let share = ledger.staking_capacity_by_user(&node(), &staker);

        for (deposit, amount) in ops {
            let balance = ledger.user_stake(&node(), &staker);
            if deposit {
                let unpenalized = ledger
                    .staker(&node(), &staker)
                    .map_or(0, |s| s.holding().unpenalized);
                let expected = effective_stake(amount, share.saturating_sub(unpenalized), penalty);
                let added = ledger.add_token_stake(&clock, &admin(), &node(), &staker, amount).unwrap();
                prop_assert_eq!(added, StakeAdjustment::between(0, expected));
                prop_assert_eq!(ledger.user_stake(&node(), &staker), balance + expected);
            } else if amount > balance {
                let result = ledger.remove_token_stake(&clock, &admin(), &node(), &staker, amount);
                let rejected = matches!(
                    result,
                    Err(StakingError::InsufficientStake { requested, available })
                        if requested == amount && available == balance
                );
                prop_assert!(rejected);
            } else {
                let removed = ledger.remove_token_stake(&clock, &admin(), &node(), &staker, amount).unwrap();
                prop_assert_eq!(removed, StakeAdjustment::Debit(amount));
                prop_assert_eq!(ledger.user_stake(&node(), &staker), balance - amount);
            }
            prop_assert_eq!(ledger.node_stake(&node()), ledger.user_stake(&node(), &staker));
            prop_assert_eq!(ledger.staking_capacity_by_user(&node(), &staker), share);
            clock.advance(7);
        }
    }
}
