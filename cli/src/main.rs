//! `sylo`: drive the Sylo stake ledger and weighted directory from the
//! command line against state persisted under a data directory.

mod commands;
mod config;
mod oracle;
mod state;

use anyhow::Context as _;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use sylo_types::{Address, Timestamp};
use sylo_utils::LogFormat;
use tracing::debug;

use crate::commands::{Command, Context};
use crate::config::SyloConfig;
use crate::state::State;

#[derive(Parser)]
#[command(name = "sylo", version, about = "Sylo stake ledger and weighted directory")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, env = "SYLO_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the persisted snapshots.
    #[arg(long, env = "SYLO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log output: "human" or "json".
    #[arg(long, env = "SYLO_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "SYLO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Evaluate the schedule at this Unix time instead of now.
    #[arg(long, env = "SYLO_AT")]
    at: Option<u64>,

    /// Account issuing the command. Defaults to the configured admin.
    #[arg(long, env = "SYLO_CALLER")]
    caller: Option<Address>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<SyloConfig> {
        let mut config = match &self.config {
            Some(path) => SyloConfig::from_toml_file(path)?,
            None => SyloConfig::default(),
        };
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    sylo_utils::init_logging(config.log_format, &config.log_level);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Command::Config = cli.command {
        write!(out, "{}", config.to_toml_string()?)?;
        return Ok(());
    }

    let schedule = config.schedule()?;
    let now = cli.at.map(Timestamp::new).unwrap_or_else(Timestamp::now);
    let oracle = config.oracle();
    let ctx = Context {
        clock: schedule.at(now),
        oracle: &oracle,
        caller: cli.caller.unwrap_or(config.admin),
    };
    debug!(now = %now, caller = %ctx.caller, seekers = oracle.len(), "evaluating command");

    let mut state = State::open(&config.data_dir, config.admin, config.staking_params()?)?;
    commands::execute(&cli.command, &mut state, &ctx, &mut out)?;
    if cli.command.mutates() {
        state
            .save()
            .with_context(|| format!("persisting state to {}", config.data_dir.display()))?;
    }
    Ok(())
}
