//! Parallel run orchestration
//!
//! Forks P independent single-run simulations on a rayon pool, each with a
//! seed derived deterministically from the master seed by run index, joins
//! them in run-index order and aggregates their results against a read-only
//! baseline. Runs share nothing but a cancellation token: the first fatal
//! run error cancels the siblings still in flight (fail fast), and the
//! orchestrator reports the lowest failing run index.

use crate::arrivals::ArrivalConfig;
use crate::metrics::{CostWeights, RunResult};
use crate::policy::PriorityWeights;
use crate::simulation::{LosConfig, Simulation, SimulationConfig, SimulationError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors ending an orchestrated batch without an aggregate.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrchestratorError {
    /// A run hit a fatal error. Reported for the lowest failing run index;
    /// siblings cancelled because of it are not data failures.
    #[error("run {run_index} (seed {seed}) failed: {source}")]
    RunFailed {
        run_index: usize,
        seed: u64,
        source: SimulationError,
    },

    /// Every incomplete run was cancelled and none failed outright.
    #[error("batch cancelled")]
    Cancelled,

    #[error("invalid orchestrator configuration: {0}")]
    InvalidConfig(String),
}

/// Shared cooperative cancellation flag, checked by each run once per slot.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Batch configuration: how many runs, over what horizon, from which seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Number of parallel runs.
    pub processes: usize,
    pub horizon_days: usize,
    pub schedule_index: usize,
    pub master_seed: u64,
    pub arrival_config: ArrivalConfig,
    pub priority_weights: PriorityWeights,
    pub cost_weights: CostWeights,
    pub los: LosConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            processes: 6,
            horizon_days: 365,
            schedule_index: 0,
            master_seed: 42,
            arrival_config: ArrivalConfig::default(),
            priority_weights: PriorityWeights::default(),
            cost_weights: CostWeights::default(),
            los: LosConfig::default(),
        }
    }
}

/// Seed for run `index` of a batch, derived from the master seed.
///
/// Splitmix64 finalizer: nearby indices map to uncorrelated seeds, and the
/// mapping is stable, so run k of a batch is reproducible in isolation.
pub fn derive_run_seed(master_seed: u64, index: u64) -> u64 {
    let mut z = master_seed.wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Runs simulation batches and aggregates their results.
///
/// # Example
///
/// ```
/// use hospital_simulator_core_rs::orchestrator::{
///     Baseline, Orchestrator, OrchestratorConfig,
/// };
///
/// let config = OrchestratorConfig {
///     processes: 2,
///     horizon_days: 7,
///     ..OrchestratorConfig::default()
/// };
/// let aggregate = Orchestrator::new(config)
///     .unwrap()
///     .run_all(&Baseline::reference())
///     .unwrap();
/// assert_eq!(aggregate.runs, 2);
/// ```
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig) -> Result<Self, OrchestratorError> {
        if config.processes == 0 {
            return Err(OrchestratorError::InvalidConfig(
                "at least one run is required".into(),
            ));
        }
        // Probe the per-run configuration now so a bad schedule index,
        // horizon or arrival config fails the batch before any run is forked.
        Simulation::new(SimulationConfig {
            horizon_days: config.horizon_days,
            arrival_config: config.arrival_config.clone(),
            ..SimulationConfig::new(1, config.schedule_index, config.master_seed)
        })
        .map_err(|e| OrchestratorError::InvalidConfig(e.to_string()))?;
        Ok(Self { config })
    }

    /// Run the configured batch and aggregate against `baseline`.
    pub fn run_all(&self, baseline: &Baseline) -> Result<AggregatedResult, OrchestratorError> {
        let configs = (0..self.config.processes)
            .map(|i| SimulationConfig {
                horizon_days: self.config.horizon_days,
                schedule_index: self.config.schedule_index,
                rng_seed: derive_run_seed(self.config.master_seed, i as u64),
                arrival_config: self.config.arrival_config.clone(),
                priority_weights: self.config.priority_weights,
                cost_weights: self.config.cost_weights,
                los: self.config.los,
            })
            .collect();
        Self::run_configs(configs, baseline)
    }

    /// Run an explicit set of per-run configurations in parallel.
    ///
    /// Results join in run-index order regardless of completion order. The
    /// first fatal error (by run index) is returned after cancelling the
    /// rest of the batch.
    pub fn run_configs(
        configs: Vec<SimulationConfig>,
        baseline: &Baseline,
    ) -> Result<AggregatedResult, OrchestratorError> {
        if configs.is_empty() {
            return Err(OrchestratorError::InvalidConfig(
                "at least one run is required".into(),
            ));
        }
        info!(runs = configs.len(), "starting batch");

        let cancel = CancelToken::new();
        let outcomes: Vec<(u64, Result<RunResult, SimulationError>)> = configs
            .into_par_iter()
            .map(|config| {
                let seed = config.rng_seed;
                let outcome =
                    Simulation::new(config).and_then(|sim| sim.run_with_cancel(&cancel));
                if matches!(&outcome, Err(e) if *e != SimulationError::Cancelled) {
                    cancel.cancel();
                }
                (seed, outcome)
            })
            .collect();

        let mut results = Vec::with_capacity(outcomes.len());
        let mut saw_cancelled = false;
        for (run_index, (seed, outcome)) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(result) => results.push(result),
                Err(SimulationError::Cancelled) => saw_cancelled = true,
                Err(source) => {
                    error!(run_index, seed, %source, "run failed, batch aborted");
                    return Err(OrchestratorError::RunFailed {
                        run_index,
                        seed,
                        source,
                    });
                }
            }
        }
        if saw_cancelled {
            return Err(OrchestratorError::Cancelled);
        }

        let aggregate = AggregatedResult::from_runs(&results, baseline);
        info!(
            runs = aggregate.runs,
            mean_total_cost = aggregate.total_weighted_cost.mean,
            "batch finished"
        );
        Ok(aggregate)
    }
}

/// Mean/min/max of one metric across a batch, plus the ratio of the mean
/// against the baseline value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub baseline_ratio: f64,
}

impl MetricStats {
    fn from_values(values: &[f64], baseline: f64) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                min: 0.0,
                max: 0.0,
                baseline_ratio: 0.0,
            };
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let baseline_ratio = if baseline == 0.0 {
            warn!("baseline value is zero, reporting ratio 0");
            0.0
        } else {
            mean / baseline
        };
        Self {
            mean,
            min,
            max,
            baseline_ratio,
        }
    }
}

/// Batch summary, created once after all runs join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub runs: usize,
    pub waiting_time_for_admission: MetricStats,
    pub waiting_time_in_hospital: MetricStats,
    pub nervousness: MetricStats,
    pub personnel_cost: MetricStats,
    pub total_weighted_cost: MetricStats,
}

impl AggregatedResult {
    /// Aggregate a set of completed runs. An empty slice yields zeroed
    /// stats with `runs == 0`, never NaN.
    pub fn from_runs(runs: &[RunResult], baseline: &Baseline) -> Self {
        let metric = |f: fn(&RunResult) -> f64, baseline: f64| {
            let values: Vec<f64> = runs.iter().map(f).collect();
            MetricStats::from_values(&values, baseline)
        };
        Self {
            runs: runs.len(),
            waiting_time_for_admission: metric(
                |r| r.waiting_time_for_admission as f64,
                baseline.waiting_time_for_admission,
            ),
            waiting_time_in_hospital: metric(
                |r| r.waiting_time_in_hospital as f64,
                baseline.waiting_time_in_hospital,
            ),
            nervousness: metric(|r| r.nervousness, baseline.nervousness),
            personnel_cost: metric(|r| r.personnel_cost, baseline.personnel_cost),
            total_weighted_cost: metric(|r| r.total_weighted_cost, baseline.total_weighted_cost),
        }
    }
}

/// Read-only reference metrics a batch is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub waiting_time_for_admission: f64,
    pub waiting_time_in_hospital: f64,
    pub nervousness: f64,
    pub personnel_cost: f64,
    pub total_weighted_cost: f64,
}

impl Baseline {
    /// Average the metrics of a set of reference runs.
    pub fn from_runs(runs: &[RunResult]) -> Self {
        let n = runs.len().max(1) as f64;
        Self {
            waiting_time_for_admission: runs
                .iter()
                .map(|r| r.waiting_time_for_admission as f64)
                .sum::<f64>()
                / n,
            waiting_time_in_hospital: runs
                .iter()
                .map(|r| r.waiting_time_in_hospital as f64)
                .sum::<f64>()
                / n,
            nervousness: runs.iter().map(|r| r.nervousness).sum::<f64>() / n,
            personnel_cost: runs.iter().map(|r| r.personnel_cost).sum::<f64>() / n,
            total_weighted_cost: runs.iter().map(|r| r.total_weighted_cost).sum::<f64>() / n,
        }
    }

    /// Frozen reference values: five 365-day runs of the historical-average
    /// schedule under default arrivals, averaged. Used when no fresh
    /// baseline batch is available.
    pub fn reference() -> Self {
        Self {
            waiting_time_for_admission: 1850.0,
            waiting_time_in_hospital: 8040.0,
            nervousness: 1714.5,
            personnel_cost: 237907.5,
            total_weighted_cost: 725327.0,
        }
    }
}
