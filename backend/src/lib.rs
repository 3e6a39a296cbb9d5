//! Hospital Simulator Core - Rust Engine
//!
//! Deterministic discrete-time simulation of hospital admission scheduling:
//! patients arrive over a slotted horizon, a greedy heuristic matches them
//! to scarce staffed capacity, and parallel runs aggregate waiting time,
//! nervousness and personnel cost against a baseline.
//!
//! # Architecture
//!
//! - **core**: Time management (slots, clock) and configuration errors
//! - **models**: Domain types (Patient, ResourceType, WardState, EventLog)
//! - **schedule**: Named staffing configurations with holiday adjustments
//! - **arrivals**: Seeded patient arrival generation
//! - **policy**: Allocation heuristics (who is admitted, who defers)
//! - **metrics**: Cost accumulation and the RunResult snapshot
//! - **simulation**: Single-run engine
//! - **orchestrator**: Parallel batch runs and aggregation
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG, split streams)
//! 2. Same seed and configuration produce byte-identical RunResults
//! 3. Per-slot admissions never exceed scheduled capacity

// Module declarations
pub mod arrivals;
pub mod core;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod rng;
pub mod schedule;
pub mod simulation;

// Re-exports for convenience
pub use arrivals::{ArrivalConfig, ArrivalSource, PatientArrivals, ScriptedArrivals};
pub use core::{ConfigError, SimClock, Slot, SlotTime, SLOTS_PER_DAY};
pub use metrics::{CostWeights, MetricsAccumulator, RunResult, UsageError};
pub use models::{Event, EventLog, Patient, PatientError, ResourceType, WardState};
pub use orchestrator::{
    AggregatedResult, Baseline, CancelToken, MetricStats, Orchestrator, OrchestratorConfig,
    OrchestratorError,
};
pub use policy::{
    AllocationDecision, AllocationError, AllocationPolicy, GreedyPriorityPolicy, PriorityWeights,
};
pub use rng::RngManager;
pub use schedule::ResourceSchedule;
pub use simulation::{LosConfig, Simulation, SimulationConfig, SimulationError};
