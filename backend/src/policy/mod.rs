//! Allocation policies
//!
//! A policy decides, each slot, which pending patients are admitted against
//! the remaining capacity of that slot and which are deferred. Policies are
//! pure with respect to the ward: they see immutable patient snapshots plus
//! a mutable view of the slot's remaining capacity, and return decisions for
//! the engine to apply. That keeps heuristics swappable without touching the
//! run loop.

pub mod greedy;

use crate::core::SlotTime;
use crate::models::{Patient, ResourceType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub use greedy::GreedyPriorityPolicy;

/// Errors surfaced while allocating a slot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// A pending patient needs a resource type the active schedule never
    /// staffs. Waiting will not help; the configuration is wrong.
    #[error("patient {patient_id} needs {need}, which the schedule never staffs")]
    UnroutablePatient {
        patient_id: usize,
        need: ResourceType,
    },
}

/// Coefficients of the priority score used to rank pending patients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityWeights {
    /// Weight of clinical severity (1..=5).
    pub severity: f64,
    /// Weight of each slot already spent waiting.
    pub waiting: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            severity: 2.0,
            waiting: 1.0,
        }
    }
}

/// One per-patient outcome of a slot's allocation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationDecision {
    Admit {
        patient_id: usize,
        need: ResourceType,
    },
    Defer {
        patient_id: usize,
        need: ResourceType,
    },
}

/// Per-slot admission heuristic.
///
/// `remaining` maps every resource type the schedule covers to the capacity
/// still free in this slot; the policy decrements entries as it admits. A
/// patient whose need has no entry at all is unroutable.
pub trait AllocationPolicy: Send {
    fn allocate(
        &mut self,
        pending: &[&Patient],
        remaining: &mut BTreeMap<ResourceType, u32>,
        now: SlotTime,
    ) -> Result<Vec<AllocationDecision>, AllocationError>;
}
