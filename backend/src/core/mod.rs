//! Time management and run initialization.

pub mod time;

use thiserror::Error;

/// Errors raised while assembling a run from its parameters.
///
/// These are fatal and surfaced immediately at construction; nothing inside
/// a running simulation produces them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown resource schedule index {index} (have {available} configurations)")]
    UnknownScheduleIndex { index: usize, available: usize },

    #[error("simulation horizon must cover at least one day")]
    InvalidHorizon,

    #[error("invalid arrival configuration: {reason}")]
    InvalidArrivalConfig { reason: String },
}

pub use time::{SimClock, Slot, SlotTime, SLOTS_PER_DAY};
