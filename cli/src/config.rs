//! `sylo` configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration. Command-line flags override file values in `main`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sylo_types::{Address, ProtocolSchedule, Seeker, StakingParams, Timestamp, TypesError};
use sylo_utils::LogFormat;
use thiserror::Error;

use crate::oracle::ConfiguredOracle;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config cannot be rendered as TOML: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid schedule: {0}")]
    Schedule(#[from] TypesError),

    #[error("capacity penalty factor must be non-zero")]
    ZeroPenaltyFactor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyloConfig {
    /// Directory holding the ledger and directory snapshots.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub log_format: LogFormat,

    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Account that administers a freshly created ledger. Also the default
    /// caller for commands.
    #[serde(default = "default_admin")]
    pub admin: Address,

    /// Coverage the local oracle reports per attribute point.
    #[serde(default = "default_coverage_per_point")]
    pub coverage_per_point: u64,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub staking: StakingConfig,

    /// Seekers known to the local capacity oracle.
    #[serde(default)]
    pub seekers: Vec<Seeker>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Unix time at which cycle 1 begins.
    #[serde(default)]
    pub start: u64,

    #[serde(default = "default_cycle_duration")]
    pub cycle_duration: u64,

    #[serde(default = "default_period_duration")]
    pub period_duration: u64,
}

/// TOML integers are 64-bit, so the parameters are held as `u64` here and
/// widened when the ledger is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    #[serde(default = "default_capacity_coverage_multiplier")]
    pub capacity_coverage_multiplier: u64,

    #[serde(default = "default_capacity_penalty_factor")]
    pub capacity_penalty_factor: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./sylo_data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_admin() -> Address {
    Address::from_low_u64(1)
}

fn default_coverage_per_point() -> u64 {
    1
}

fn default_cycle_duration() -> u64 {
    14 * 86_400
}

fn default_period_duration() -> u64 {
    86_400
}

fn default_capacity_coverage_multiplier() -> u64 {
    StakingParams::default().capacity_coverage_multiplier as u64
}

fn default_capacity_penalty_factor() -> u64 {
    StakingParams::default().capacity_penalty_factor as u64
}

impl SyloConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn schedule(&self) -> Result<ProtocolSchedule, ConfigError> {
        Ok(ProtocolSchedule::new(
            Timestamp::new(self.schedule.start),
            self.schedule.cycle_duration,
            self.schedule.period_duration,
        )?)
    }

    pub fn staking_params(&self) -> Result<StakingParams, ConfigError> {
        if self.staking.capacity_penalty_factor == 0 {
            return Err(ConfigError::ZeroPenaltyFactor);
        }
        Ok(StakingParams {
            capacity_coverage_multiplier: self.staking.capacity_coverage_multiplier.into(),
            capacity_penalty_factor: self.staking.capacity_penalty_factor.into(),
        })
    }

    /// The local capacity oracle, seeded with the configured seekers.
    pub fn oracle(&self) -> ConfiguredOracle {
        ConfiguredOracle::new(&self.seekers, self.coverage_per_point.into())
    }
}

impl Default for SyloConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            admin: default_admin(),
            coverage_per_point: default_coverage_per_point(),
            schedule: ScheduleConfig::default(),
            staking: StakingConfig::default(),
            seekers: Vec::new(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start: 0,
            cycle_duration: default_cycle_duration(),
            period_duration: default_period_duration(),
        }
    }
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            capacity_coverage_multiplier: default_capacity_coverage_multiplier(),
            capacity_penalty_factor: default_capacity_penalty_factor(),
        }
    }
}
