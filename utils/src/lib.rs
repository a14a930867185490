//! Shared utilities for the Sylo staking protocol.

pub mod logging;
pub mod math;
pub mod time;

pub use logging::{init_logging, init_tracing, LogFormat};
pub use math::{mul_div, point_to_weight, weight_to_point};
pub use time::{format_cycle_progress, format_duration};
