//! Errors raised while constructing shared protocol types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("seeker attribute arithmetic overflow")]
    AttributeOverflow,
}
