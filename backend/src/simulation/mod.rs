//! Single-run simulation engine
//!
//! Binds a clock, a resource schedule, an arrival source, an allocation
//! policy and a metrics accumulator for one seed, then drives them slot by
//! slot until the horizon is exhausted. Running consumes the simulation, so
//! a finalized run can never be re-entered.

pub mod engine;

use crate::arrivals::ArrivalConfig;
use crate::core::ConfigError;
use crate::metrics::{CostWeights, UsageError};
use crate::models::PatientError;
use crate::policy::{AllocationError, PriorityWeights};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use engine::Simulation;

/// Anything that can end a run without a result.
///
/// Deferrals, empty slots and unresolved patients at the horizon are never
/// errors; everything here is either a configuration mismatch or an engine
/// contract violation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Patient(#[from] PatientError),

    /// The run was cancelled cooperatively before completion.
    #[error("run cancelled")]
    Cancelled,
}

/// Severity-dependent length-of-stay model.
///
/// A patient's stay is `base_slots + per_severity_slots * severity` plus a
/// uniform jitter in `0..=jitter_slots`, drawn once at admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LosConfig {
    pub base_slots: usize,
    pub per_severity_slots: usize,
    pub jitter_slots: usize,
}

impl Default for LosConfig {
    fn default() -> Self {
        Self {
            base_slots: 1,
            per_severity_slots: 1,
            jitter_slots: 2,
        }
    }
}

/// Everything one run needs, bound at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub horizon_days: usize,
    pub schedule_index: usize,
    pub rng_seed: u64,
    pub arrival_config: ArrivalConfig,
    pub priority_weights: PriorityWeights,
    pub cost_weights: CostWeights,
    pub los: LosConfig,
}

impl SimulationConfig {
    pub fn new(horizon_days: usize, schedule_index: usize, rng_seed: u64) -> Self {
        Self {
            horizon_days,
            schedule_index,
            rng_seed,
            arrival_config: ArrivalConfig::default(),
            priority_weights: PriorityWeights::default(),
            cost_weights: CostWeights::default(),
            los: LosConfig::default(),
        }
    }
}
