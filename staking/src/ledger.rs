//! The stake ledger: per-node and per-staker balances, capacity shares and
//! reward cycle snapshots.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use sylo_store::{SnapshotKind, SnapshotStore};
use sylo_types::{
    Address, CapacityOracle, CycleClock, CycleId, Seeker, SeekerAttributes, SeekerId,
    StakingParams,
};
use sylo_utils::mul_div;
use tracing::{debug, info};

use crate::additions::{AdditionQueue, TimeWeight};
use crate::error::StakingError;
use crate::history::RewardCycleHistory;
use crate::reclassify::{reclassify, Holding, StakeAdjustment};
use crate::roles::{Role, RoleRegistry};

/// Identifies one staker's position against one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakeKey {
    pub node: Address,
    pub staker: Address,
}

impl StakeKey {
    pub fn new(node: Address, staker: Address) -> Self {
        Self { node, staker }
    }
}

/// One staker's position against one node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerLedger {
    holding: Holding,
    capacity: u128,
    rank: u128,
    attributes: SeekerAttributes,
    seekers: BTreeMap<SeekerId, Seeker>,
    additions: AdditionQueue,
    history: RewardCycleHistory,
}

impl StakerLedger {
    /// Raw tokens behind the balance.
    pub fn deposit(&self) -> u128 {
        self.holding.deposit()
    }

    /// Penalty-adjusted balance.
    pub fn effective(&self) -> u128 {
        self.holding.balance()
    }

    /// The covered and penalized parts of the balance.
    pub fn holding(&self) -> &Holding {
        &self.holding
    }

    /// Capacity share applied at the last mutation.
    pub fn capacity(&self) -> u128 {
        self.capacity
    }

    pub fn rank(&self) -> u128 {
        self.rank
    }

    pub fn attributes(&self) -> &SeekerAttributes {
        &self.attributes
    }

    pub fn seekers(&self) -> impl Iterator<Item = &Seeker> {
        self.seekers.values()
    }

    pub fn additions(&self) -> &AdditionQueue {
        &self.additions
    }

    pub fn history(&self) -> &RewardCycleHistory {
        &self.history
    }
}

/// Aggregates for one node across all of its stakers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLedger {
    stake: u128,
    rank: u128,
    attributes: SeekerAttributes,
    coverage: u128,
    history: RewardCycleHistory,
}

impl NodeLedger {
    /// Sum of the effective balances of every staker.
    pub fn stake(&self) -> u128 {
        self.stake
    }

    pub fn rank(&self) -> u128 {
        self.rank
    }

    pub fn attributes(&self) -> &SeekerAttributes {
        &self.attributes
    }

    /// Coverage score last reported by the oracle.
    pub fn coverage(&self) -> u128 {
        self.coverage
    }

    pub fn history(&self) -> &RewardCycleHistory {
        &self.history
    }

    pub fn capacity(&self, multiplier: u128) -> u128 {
        self.coverage.saturating_mul(multiplier)
    }

    /// `capacity * rank / total_rank`, zero when no rank is staked.
    fn share_for(&self, rank: u128, multiplier: u128) -> Result<u128, StakingError> {
        if self.rank == 0 {
            return Ok(0);
        }
        mul_div(self.capacity(multiplier), rank, self.rank).ok_or(StakingError::Overflow)
    }
}

/// Stake accounting for every node and staker.
///
/// Mutations validate their arguments, then work on copies of the affected
/// node and staker records and write both back only once every step has
/// succeeded, so a failed call leaves the ledger untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeLedger {
    params: StakingParams,
    roles: RoleRegistry,
    nodes: HashMap<Address, NodeLedger>,
    stakers: HashMap<StakeKey, StakerLedger>,
    seeker_positions: HashMap<SeekerId, StakeKey>,
}

impl StakeLedger {
    /// Create an empty ledger administered by `admin`, who also holds the
    /// staking manager role.
    pub fn new(admin: Address, params: StakingParams) -> Result<Self, StakingError> {
        if params.capacity_penalty_factor == 0 {
            return Err(StakingError::ZeroPenaltyFactor);
        }
        Ok(Self {
            params,
            roles: RoleRegistry::with_admin(admin),
            nodes: HashMap::new(),
            stakers: HashMap::new(),
            seeker_positions: HashMap::new(),
        })
    }

    // ── Token stake ─────────────────────────────────────────────────────

    /// Deposit `amount` tokens from `staker` against `node`.
    ///
    /// The deposit is split on its own: the part that fits the capacity still
    /// free for full-value stake counts in full, the rest is divided by the
    /// penalty factor (see [`crate::reclassify::effective_stake`]).
    pub fn add_token_stake(
        &mut self,
        clock: &dyn CycleClock,
        caller: &Address,
        node: &Address,
        staker: &Address,
        amount: u128,
    ) -> Result<StakeAdjustment, StakingError> {
        self.roles.require(Role::StakingManager, caller)?;
        let key = validate_key(node, staker)?;
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }

        let (mut node_ledger, mut staker_ledger) = self.checkout(&key);
        let adjustment = self.settle(
            clock,
            &mut node_ledger,
            &mut staker_ledger,
            TokenChange::Deposit(amount),
        )?;

        debug!(
            node = %node,
            staker = %staker,
            amount,
            effective = staker_ledger.effective(),
            cycle = clock.current_cycle(),
            "token stake added"
        );
        self.commit(key, node_ledger, staker_ledger);
        Ok(adjustment)
    }

    /// Take `amount` off the balance `staker` holds against `node`.
    ///
    /// The bound is the effective balance reported by [`Self::user_stake`];
    /// the staker and node balances both drop by exactly `amount`.
    pub fn remove_token_stake(
        &mut self,
        clock: &dyn CycleClock,
        caller: &Address,
        node: &Address,
        staker: &Address,
        amount: u128,
    ) -> Result<StakeAdjustment, StakingError> {
        self.roles.require(Role::StakingManager, caller)?;
        let key = validate_key(node, staker)?;
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }

        let (mut node_ledger, mut staker_ledger) = self.checkout(&key);
        let adjustment = self.settle(
            clock,
            &mut node_ledger,
            &mut staker_ledger,
            TokenChange::Withdraw(amount),
        )?;

        debug!(
            node = %node,
            staker = %staker,
            amount,
            effective = staker_ledger.effective(),
            cycle = clock.current_cycle(),
            "token stake removed"
        );
        self.commit(key, node_ledger, staker_ledger);
        Ok(adjustment)
    }

    // ── Seeker stake ────────────────────────────────────────────────────

    /// Stake a registered seeker to raise the node's capacity.
    pub fn add_seeker_stake(
        &mut self,
        clock: &dyn CycleClock,
        oracle: &dyn CapacityOracle,
        caller: &Address,
        node: &Address,
        staker: &Address,
        seeker_id: SeekerId,
    ) -> Result<StakeAdjustment, StakingError> {
        self.roles.require(Role::StakingManager, caller)?;
        let key = validate_key(node, staker)?;
        let seeker = oracle
            .seeker(seeker_id)
            .ok_or(StakingError::SeekerNotRegistered(seeker_id))?;
        if self.seeker_positions.contains_key(&seeker_id) {
            return Err(StakingError::SeekerAlreadyStaked(seeker_id));
        }

        let (mut node_ledger, mut staker_ledger) = self.checkout(&key);
        let rank = seeker.rank as u128;
        staker_ledger.attributes = staker_ledger.attributes.checked_add(&seeker.attributes)?;
        staker_ledger.rank = staker_ledger
            .rank
            .checked_add(rank)
            .ok_or(StakingError::Overflow)?;
        node_ledger.attributes = node_ledger.attributes.checked_add(&seeker.attributes)?;
        node_ledger.rank = node_ledger
            .rank
            .checked_add(rank)
            .ok_or(StakingError::Overflow)?;
        node_ledger.coverage = oracle.coverage(&node_ledger.attributes);
        staker_ledger.seekers.insert(seeker_id, seeker);

        let adjustment = self.settle(
            clock,
            &mut node_ledger,
            &mut staker_ledger,
            TokenChange::None,
        )?;

        debug!(
            node = %node,
            staker = %staker,
            seeker = seeker_id,
            coverage = node_ledger.coverage,
            capacity = staker_ledger.capacity,
            "seeker staked"
        );
        self.commit(key, node_ledger, staker_ledger);
        self.seeker_positions.insert(seeker_id, key);
        Ok(adjustment)
    }

    /// Unstake a seeker previously staked by the same node and staker.
    pub fn remove_seeker_stake(
        &mut self,
        clock: &dyn CycleClock,
        oracle: &dyn CapacityOracle,
        caller: &Address,
        node: &Address,
        staker: &Address,
        seeker_id: SeekerId,
    ) -> Result<StakeAdjustment, StakingError> {
        self.roles.require(Role::StakingManager, caller)?;
        let key = validate_key(node, staker)?;
        if self.seeker_positions.get(&seeker_id) != Some(&key) {
            return Err(StakingError::SeekerNotStaked(seeker_id));
        }

        let (mut node_ledger, mut staker_ledger) = self.checkout(&key);
        let seeker = staker_ledger
            .seekers
            .remove(&seeker_id)
            .ok_or(StakingError::SeekerNotStaked(seeker_id))?;
        let rank = seeker.rank as u128;
        staker_ledger.attributes = staker_ledger.attributes.checked_sub(&seeker.attributes)?;
        staker_ledger.rank = staker_ledger
            .rank
            .checked_sub(rank)
            .ok_or(StakingError::Overflow)?;
        node_ledger.attributes = node_ledger.attributes.checked_sub(&seeker.attributes)?;
        node_ledger.rank = node_ledger
            .rank
            .checked_sub(rank)
            .ok_or(StakingError::Overflow)?;
        node_ledger.coverage = oracle.coverage(&node_ledger.attributes);

        let adjustment = self.settle(
            clock,
            &mut node_ledger,
            &mut staker_ledger,
            TokenChange::None,
        )?;

        debug!(
            node = %node,
            staker = %staker,
            seeker = seeker_id,
            coverage = node_ledger.coverage,
            capacity = staker_ledger.capacity,
            "seeker unstaked"
        );
        self.commit(key, node_ledger, staker_ledger);
        self.seeker_positions.remove(&seeker_id);
        Ok(adjustment)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    /// Effective (penalty-adjusted) stake of `staker` against `node`.
    pub fn user_stake(&self, node: &Address, staker: &Address) -> u128 {
        self.staker(node, staker).map_or(0, |s| s.effective())
    }

    /// Raw tokens behind the balance of `staker` against `node`.
    pub fn user_deposit(&self, node: &Address, staker: &Address) -> u128 {
        self.staker(node, staker).map_or(0, |s| s.deposit())
    }

    /// Sum of the effective stakes held against `node`.
    pub fn node_stake(&self, node: &Address) -> u128 {
        self.nodes.get(node).map_or(0, |n| n.stake)
    }

    pub fn reward_cycle_stake_by_user(
        &self,
        cycle: CycleId,
        node: &Address,
        staker: &Address,
    ) -> u128 {
        self.staker(node, staker)
            .map_or(0, |s| s.history.stake_at(cycle))
    }

    pub fn reward_cycle_stake_by_node(&self, cycle: CycleId, node: &Address) -> u128 {
        self.nodes
            .get(node)
            .map_or(0, |n| n.history.stake_at(cycle))
    }

    /// Node capacity at the current coverage multiplier.
    pub fn staking_capacity_by_node(&self, node: &Address) -> u128 {
        self.nodes
            .get(node)
            .map_or(0, |n| n.capacity(self.params.capacity_coverage_multiplier))
    }

    /// The capacity share applied at the staker's last mutation.
    pub fn staking_capacity_by_user(&self, node: &Address, staker: &Address) -> u128 {
        self.staker(node, staker).map_or(0, |s| s.capacity)
    }

    pub fn staked_seekers(&self, node: &Address, staker: &Address) -> Vec<SeekerId> {
        self.staker(node, staker)
            .map(|s| s.seekers.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Where a seeker is currently staked.
    pub fn seeker_position(&self, seeker_id: SeekerId) -> Option<StakeKey> {
        self.seeker_positions.get(&seeker_id).copied()
    }

    pub fn node(&self, node: &Address) -> Option<&NodeLedger> {
        self.nodes.get(node)
    }

    pub fn staker(&self, node: &Address, staker: &Address) -> Option<&StakerLedger> {
        self.stakers.get(&StakeKey::new(*node, *staker))
    }

    /// Every node that has ever been staked against, in address order.
    pub fn nodes(&self) -> Vec<Address> {
        let mut nodes: Vec<Address> = self.nodes.keys().copied().collect();
        nodes.sort();
        nodes
    }

    /// Every staker that has ever staked against `node`, in address order.
    pub fn stakers_of(&self, node: &Address) -> Vec<Address> {
        let mut stakers: Vec<Address> = self
            .stakers
            .keys()
            .filter(|key| key.node == *node)
            .map(|key| key.staker)
            .collect();
        stakers.sort();
        stakers
    }

    // ── Administration ──────────────────────────────────────────────────

    pub fn params(&self) -> &StakingParams {
        &self.params
    }

    pub fn set_capacity_coverage_multiplier(
        &mut self,
        caller: &Address,
        multiplier: u128,
    ) -> Result<(), StakingError> {
        self.roles.require(Role::Admin, caller)?;
        self.params.capacity_coverage_multiplier = multiplier;
        info!(multiplier, "capacity coverage multiplier updated");
        Ok(())
    }

    pub fn set_capacity_penalty_factor(
        &mut self,
        caller: &Address,
        factor: u128,
    ) -> Result<(), StakingError> {
        self.roles.require(Role::Admin, caller)?;
        if factor == 0 {
            return Err(StakingError::ZeroPenaltyFactor);
        }
        self.params.capacity_penalty_factor = factor;
        info!(factor, "capacity penalty factor updated");
        Ok(())
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles.has_role(role, account)
    }

    /// Returns `true` if the role was newly granted.
    pub fn grant_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: Address,
    ) -> Result<bool, StakingError> {
        self.roles.require(Role::Admin, caller)?;
        let granted = self.roles.insert(role, account);
        if granted {
            info!(role = %role, account = %account, "role granted");
        }
        Ok(granted)
    }

    /// Returns `true` if the account held the role.
    pub fn revoke_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: &Address,
    ) -> Result<bool, StakingError> {
        self.roles.require(Role::Admin, caller)?;
        let revoked = self.roles.remove(role, account);
        if revoked {
            info!(role = %role, account = %account, "role revoked");
        }
        Ok(revoked)
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn checkout(&self, key: &StakeKey) -> (NodeLedger, StakerLedger) {
        (
            self.nodes.get(&key.node).cloned().unwrap_or_default(),
            self.stakers.get(key).cloned().unwrap_or_default(),
        )
    }

    fn commit(&mut self, key: StakeKey, node: NodeLedger, staker: StakerLedger) {
        self.nodes.insert(key.node, node);
        self.stakers.insert(key, staker);
    }

    /// Apply `change` to the staker's holding, then refit the holding to
    /// the staker's current capacity share. Every change to the balance is
    /// mirrored onto the node.
    fn settle(
        &self,
        clock: &dyn CycleClock,
        node: &mut NodeLedger,
        staker: &mut StakerLedger,
        change: TokenChange,
    ) -> Result<StakeAdjustment, StakingError> {
        let cycle = clock.current_cycle();
        let weight = TimeWeight::at(clock);
        let penalty = self.params.capacity_penalty_factor;
        let before = staker.effective();

        staker.additions.roll_to(cycle);
        staker.history.open(cycle);
        node.history.open(cycle);

        let share = node.share_for(staker.rank, self.params.capacity_coverage_multiplier)?;
        match change {
            TokenChange::Deposit(amount) => {
                let credited = staker.holding.deposit_tokens(amount, share, penalty)?;
                apply(cycle, weight, node, staker, StakeAdjustment::between(0, credited))?;
            }
            TokenChange::Withdraw(amount) => {
                staker.holding.withdraw(amount)?;
                apply(cycle, weight, node, staker, StakeAdjustment::Debit(amount))?;
            }
            TokenChange::None => {}
        }

        let (holding, adjustment) = reclassify(&staker.holding, share, penalty)?;
        staker.holding = holding;
        apply(cycle, weight, node, staker, adjustment)?;

        staker.capacity = share;
        Ok(StakeAdjustment::between(before, staker.effective()))
    }
}

/// The token movement a mutation makes before capacity is refitted.
#[derive(Clone, Copy, Debug)]
enum TokenChange {
    Deposit(u128),
    Withdraw(u128),
    None,
}

/// Mirror a balance change into the addition queue, the node aggregate and
/// both reward cycle histories.
fn apply(
    cycle: CycleId,
    weight: TimeWeight,
    node: &mut NodeLedger,
    staker: &mut StakerLedger,
    adjustment: StakeAdjustment,
) -> Result<(), StakingError> {
    match adjustment {
        StakeAdjustment::Credit(amount) => {
            let weighted = staker.additions.push(amount, weight)?;
            node.stake = node
                .stake
                .checked_add(amount)
                .ok_or(StakingError::Overflow)?;
            staker.history.credit(cycle, weighted, amount)?;
            node.history.credit(cycle, weighted, amount)?;
        }
        StakeAdjustment::Debit(amount) => {
            let weighted = staker.additions.consume(amount)?;
            node.stake = node
                .stake
                .checked_sub(amount)
                .ok_or(StakingError::Overflow)?;
            staker.history.debit(cycle, weighted, amount)?;
            node.history.debit(cycle, weighted, amount)?;
        }
        StakeAdjustment::Unchanged => {}
    }
    Ok(())
}

impl StakeLedger {
    /// Persist the whole ledger as one snapshot.
    pub fn save_to_store(&self, store: &dyn SnapshotStore) -> Result<(), StakingError> {
        let bytes =
            bincode::serialize(self).map_err(|e| StakingError::Serialization(e.to_string()))?;
        store.put_snapshot(SnapshotKind::StakeLedger, &bytes)?;
        Ok(())
    }

    /// Restore a ledger, or `None` if none was ever saved.
    pub fn load_from_store(store: &dyn SnapshotStore) -> Result<Option<Self>, StakingError> {
        match store.get_snapshot(SnapshotKind::StakeLedger)? {
            Some(bytes) => bincode::deserialize(&bytes)
                .map(Some)
                .map_err(|e| StakingError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }
}

fn validate_key(node: &Address, staker: &Address) -> Result<StakeKey, StakingError> {
    if node.is_zero() {
        return Err(StakingError::ZeroNodeAddress);
    }
    if staker.is_zero() {
        return Err(StakingError::ZeroStakerAddress);
    }
    Ok(StakeKey::new(*node, *staker))
}
