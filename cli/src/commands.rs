//! Subcommands and their execution against loaded state.

use anyhow::Context as _;
use clap::Subcommand;
use std::io::Write;
use sylo_staking::{Role, StakeAdjustment};
use sylo_types::{Address, CycleClock, CycleId, PeriodId, ProtocolTime, SeekerId};
use sylo_utils::{format_cycle_progress, format_duration};
use tracing::warn;

use crate::oracle::ConfiguredOracle;
use crate::state::State;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deposit or withdraw token stake.
    #[command(subcommand)]
    Stake(StakeCommand),

    /// Stake or unstake a seeker for capacity.
    #[command(subcommand)]
    Seeker(SeekerCommand),

    /// Join the next directory period with the node's current stake.
    Join {
        #[arg(long)]
        node: Address,
    },

    /// Find the node owning a point in [0, 2^128).
    Scan {
        point: u128,
        /// Defaults to the current cycle.
        #[arg(long)]
        cycle: Option<CycleId>,
        /// Defaults to the current period.
        #[arg(long)]
        period: Option<PeriodId>,
    },

    /// List a directory period's entries and their point ranges.
    Entries {
        #[arg(long)]
        cycle: Option<CycleId>,
        #[arg(long)]
        period: Option<PeriodId>,
    },

    /// Show the clock, parameters and stake balances.
    Status {
        #[arg(long)]
        node: Option<Address>,
        #[arg(long, requires = "node")]
        staker: Option<Address>,
    },

    /// Parameter and role administration.
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Subcommand, Debug)]
pub enum StakeCommand {
    Add {
        #[arg(long)]
        node: Address,
        #[arg(long)]
        staker: Address,
        #[arg(long)]
        amount: u128,
    },
    Remove {
        #[arg(long)]
        node: Address,
        #[arg(long)]
        staker: Address,
        #[arg(long)]
        amount: u128,
    },
}

#[derive(Subcommand, Debug)]
pub enum SeekerCommand {
    Add {
        #[arg(long)]
        node: Address,
        #[arg(long)]
        staker: Address,
        #[arg(long)]
        seeker: SeekerId,
    },
    Remove {
        #[arg(long)]
        node: Address,
        #[arg(long)]
        staker: Address,
        #[arg(long)]
        seeker: SeekerId,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    SetMultiplier { value: u128 },
    SetPenalty { value: u128 },
    Grant { role: Role, account: Address },
    Revoke { role: Role, account: Address },
}

/// What a command needs besides the state it runs against.
pub struct Context<'a> {
    pub clock: ProtocolTime,
    pub oracle: &'a ConfiguredOracle,
    pub caller: Address,
}

impl Command {
    /// Whether a successful run changes persisted state.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Stake(_) | Command::Seeker(_) | Command::Join { .. } | Command::Admin(_)
        )
    }
}

/// Run `command`, writing its report to `out`. Rejected calls are logged
/// and returned as errors with the state left untouched.
pub fn execute(
    command: &Command,
    state: &mut State,
    ctx: &Context<'_>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let result = run(command, state, ctx, out);
    if let Err(e) = &result {
        warn!(command = ?command, caller = %ctx.caller, error = %e, "command rejected");
    }
    result
}

fn run(
    command: &Command,
    state: &mut State,
    ctx: &Context<'_>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let clock = &ctx.clock;
    match command {
        Command::Stake(StakeCommand::Add {
            node,
            staker,
            amount,
        }) => {
            let adjustment = state
                .ledger
                .add_token_stake(clock, &ctx.caller, node, staker, *amount)
                .context("adding token stake")?;
            report_adjustment(out, clock, adjustment)?;
            report_balances(out, state, node, staker)?;
        }
        Command::Stake(StakeCommand::Remove {
            node,
            staker,
            amount,
        }) => {
            let adjustment = state
                .ledger
                .remove_token_stake(clock, &ctx.caller, node, staker, *amount)
                .context("removing token stake")?;
            report_adjustment(out, clock, adjustment)?;
            report_balances(out, state, node, staker)?;
        }
        Command::Seeker(SeekerCommand::Add {
            node,
            staker,
            seeker,
        }) => {
            let adjustment = state
                .ledger
                .add_seeker_stake(clock, ctx.oracle, &ctx.caller, node, staker, *seeker)
                .context("staking seeker")?;
            report_adjustment(out, clock, adjustment)?;
            report_balances(out, state, node, staker)?;
        }
        Command::Seeker(SeekerCommand::Remove {
            node,
            staker,
            seeker,
        }) => {
            let adjustment = state
                .ledger
                .remove_seeker_stake(clock, ctx.oracle, &ctx.caller, node, staker, *seeker)
                .context("unstaking seeker")?;
            report_adjustment(out, clock, adjustment)?;
            report_balances(out, state, node, staker)?;
        }
        Command::Join { node } => {
            let (cycle, period) = state
                .directory
                .join_next_directory(clock, &state.ledger, node)
                .context("joining directory")?;
            writeln!(
                out,
                "joined {node} to cycle {cycle} period {period} with stake {}",
                state.directory.directory_stake(cycle, period, node)
            )?;
        }
        Command::Scan {
            point,
            cycle,
            period,
        } => {
            let (cycle, period) = resolve_period(clock, *cycle, *period);
            let node = state.directory.scan_with_time(*point, cycle, period);
            if node.is_zero() {
                writeln!(out, "no node in cycle {cycle} period {period}")?;
            } else {
                writeln!(out, "{node}")?;
            }
        }
        Command::Entries { cycle, period } => {
            let (cycle, period) = resolve_period(clock, *cycle, *period);
            let entries = state.directory.entries(cycle, period);
            writeln!(
                out,
                "cycle {cycle} period {period}: {} nodes, total stake {}",
                entries.len(),
                state.directory.total_stake(cycle, period)
            )?;
            for entry in entries {
                writeln!(
                    out,
                    "{} stake={} cumulative={} points={}..={}",
                    entry.node,
                    entry.stake,
                    entry.cumulative_stake,
                    entry.range_start,
                    entry.range_end
                )?;
            }
        }
        Command::Status { node, staker } => report_status(out, state, clock, node, staker)?,
        Command::Admin(admin) => run_admin(admin, state, &ctx.caller, out)?,
        // rendered by main before state is opened
        Command::Config => {}
    }
    Ok(())
}

fn run_admin(
    command: &AdminCommand,
    state: &mut State,
    caller: &Address,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        AdminCommand::SetMultiplier { value } => {
            state
                .ledger
                .set_capacity_coverage_multiplier(caller, *value)?;
            writeln!(out, "capacity coverage multiplier = {value}")?;
        }
        AdminCommand::SetPenalty { value } => {
            state.ledger.set_capacity_penalty_factor(caller, *value)?;
            writeln!(out, "capacity penalty factor = {value}")?;
        }
        AdminCommand::Grant { role, account } => {
            let granted = state.ledger.grant_role(caller, *role, *account)?;
            if granted {
                writeln!(out, "granted {role} to {account}")?;
            } else {
                writeln!(out, "{account} already holds {role}")?;
            }
        }
        AdminCommand::Revoke { role, account } => {
            let revoked = state.ledger.revoke_role(caller, *role, account)?;
            if revoked {
                writeln!(out, "revoked {role} from {account}")?;
            } else {
                writeln!(out, "{account} does not hold {role}")?;
            }
        }
    }
    Ok(())
}

fn resolve_period(
    clock: &dyn CycleClock,
    cycle: Option<CycleId>,
    period: Option<PeriodId>,
) -> (CycleId, PeriodId) {
    (
        cycle.unwrap_or_else(|| clock.current_cycle()),
        period.unwrap_or_else(|| clock.current_period()),
    )
}

fn report_adjustment(
    out: &mut dyn Write,
    clock: &dyn CycleClock,
    adjustment: StakeAdjustment,
) -> std::io::Result<()> {
    let cycle = clock.current_cycle();
    match adjustment {
        StakeAdjustment::Credit(amount) => {
            writeln!(out, "credited {amount} effective stake in cycle {cycle}")
        }
        StakeAdjustment::Debit(amount) => {
            writeln!(out, "debited {amount} effective stake in cycle {cycle}")
        }
        StakeAdjustment::Unchanged => writeln!(out, "effective stake unchanged"),
    }
}

fn report_balances(
    out: &mut dyn Write,
    state: &State,
    node: &Address,
    staker: &Address,
) -> std::io::Result<()> {
    let ledger = &state.ledger;
    writeln!(
        out,
        "user stake {} (deposit {}), node stake {}",
        ledger.user_stake(node, staker),
        ledger.user_deposit(node, staker),
        ledger.node_stake(node)
    )
}

fn report_status(
    out: &mut dyn Write,
    state: &State,
    clock: &dyn CycleClock,
    node: &Option<Address>,
    staker: &Option<Address>,
) -> std::io::Result<()> {
    let ledger = &state.ledger;
    let cycle = clock.current_cycle();
    if clock.has_protocol_started() {
        writeln!(
            out,
            "cycle {cycle} period {}/{}, {} elapsed ({})",
            clock.current_period(),
            clock.periods_per_cycle(),
            format_duration(clock.elapsed_in_cycle()),
            format_cycle_progress(clock.elapsed_in_cycle(), clock.cycle_duration())
        )?;
    } else {
        writeln!(out, "protocol not started")?;
    }
    let params = ledger.params();
    writeln!(
        out,
        "capacity coverage multiplier {}, penalty factor {}",
        params.capacity_coverage_multiplier, params.capacity_penalty_factor
    )?;

    let Some(node) = node else {
        for node in ledger.nodes() {
            writeln!(
                out,
                "{node} stake={} reward_stake={} directory_stake={}",
                ledger.node_stake(&node),
                ledger.reward_cycle_stake_by_node(cycle, &node),
                state
                    .directory
                    .directory_stake(cycle, clock.current_period(), &node)
            )?;
        }
        return Ok(());
    };

    writeln!(
        out,
        "node {node}: stake {}, capacity {}, reward stake {} in cycle {cycle}",
        ledger.node_stake(node),
        ledger.staking_capacity_by_node(node),
        ledger.reward_cycle_stake_by_node(cycle, node)
    )?;
    let stakers = match staker {
        Some(staker) => vec![*staker],
        None => ledger.stakers_of(node),
    };
    for staker in stakers {
        let seekers: Vec<String> = ledger
            .staked_seekers(node, &staker)
            .iter()
            .map(|id| id.to_string())
            .collect();
        writeln!(
            out,
            "  staker {staker}: stake {} deposit {} capacity {} reward stake {} seekers [{}]",
            ledger.user_stake(node, &staker),
            ledger.user_deposit(node, &staker),
            ledger.staking_capacity_by_user(node, &staker),
            ledger.reward_cycle_stake_by_user(cycle, node, &staker),
            seekers.join(", ")
        )?;
    }
    Ok(())
}
