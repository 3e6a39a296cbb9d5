//! Run metrics and cost model
//!
//! A [`MetricsAccumulator`] collects the four cost components of a run as
//! the engine produces them (admission waits, in-hospital stays,
//! nervousness, personnel cost) and freezes into an immutable [`RunResult`]
//! exactly once. Mutating after finalization, or finalizing twice, is an
//! engine bug surfaced as [`UsageError`] rather than silently absorbed.

use crate::models::EventLog;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Misuse of the accumulate-then-freeze protocol.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("cannot record metrics after finalization")]
    MutateAfterFinalize,
    #[error("metrics already finalized")]
    AlreadyFinalized,
}

/// Weights combining the cost components into one comparable total.
///
/// Personnel cost dominates by design: staffing is the expensive lever, so
/// it carries triple weight against the patient-experience terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    pub admission_wait: f64,
    pub hospital_wait: f64,
    pub nervousness: f64,
    pub personnel_multiplier: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            admission_wait: 1.0,
            hospital_wait: 1.0,
            nervousness: 1.0,
            personnel_multiplier: 3.0,
        }
    }
}

/// Accumulates a single run's metrics; freezes into a [`RunResult`].
#[derive(Debug, Clone, Default)]
pub struct MetricsAccumulator {
    weights: CostWeights,
    waiting_time_for_admission: u64,
    waiting_time_in_hospital: u64,
    nervousness: f64,
    personnel_cost: f64,
    patients_admitted: usize,
    patients_discharged: usize,
    unresolved_pending: usize,
    unresolved_in_hospital: usize,
    finalized: bool,
}

impl MetricsAccumulator {
    pub fn new(weights: CostWeights) -> Self {
        Self {
            weights,
            ..Self::default()
        }
    }

    fn check_open(&self) -> Result<(), UsageError> {
        if self.finalized {
            return Err(UsageError::MutateAfterFinalize);
        }
        Ok(())
    }

    /// Record an admission that waited `waited_slots` since arrival.
    pub fn observe_admission(&mut self, waited_slots: usize) -> Result<(), UsageError> {
        self.check_open()?;
        self.waiting_time_for_admission += waited_slots as u64;
        self.patients_admitted += 1;
        Ok(())
    }

    /// Record a discharge after a stay of `stay_slots` (discharge minus
    /// admission).
    pub fn observe_discharge(&mut self, stay_slots: usize) -> Result<(), UsageError> {
        self.check_open()?;
        self.waiting_time_in_hospital += stay_slots as u64;
        self.patients_discharged += 1;
        Ok(())
    }

    /// Add nervousness accrued by deferred patients this slot.
    pub fn accrue_nervousness(&mut self, delta: f64) -> Result<(), UsageError> {
        self.check_open()?;
        self.nervousness += delta;
        Ok(())
    }

    /// Add the cost of the staff scheduled for one slot.
    pub fn accrue_staffing(&mut self, cost: f64) -> Result<(), UsageError> {
        self.check_open()?;
        self.personnel_cost += cost;
        Ok(())
    }

    /// Record patients left unresolved when the horizon ended.
    pub fn record_unresolved(
        &mut self,
        pending: usize,
        in_hospital: usize,
    ) -> Result<(), UsageError> {
        self.check_open()?;
        self.unresolved_pending = pending;
        self.unresolved_in_hospital = in_hospital;
        Ok(())
    }

    /// Freeze the accumulator into an immutable result. One-shot.
    pub fn finalize(&mut self, events: EventLog, seed: u64) -> Result<RunResult, UsageError> {
        if self.finalized {
            return Err(UsageError::AlreadyFinalized);
        }
        self.finalized = true;

        let w = self.weights;
        let total_weighted_cost = w.personnel_multiplier * self.personnel_cost
            + w.admission_wait * self.waiting_time_for_admission as f64
            + w.hospital_wait * self.waiting_time_in_hospital as f64
            + w.nervousness * self.nervousness;

        Ok(RunResult {
            seed,
            waiting_time_for_admission: self.waiting_time_for_admission,
            waiting_time_in_hospital: self.waiting_time_in_hospital,
            nervousness: self.nervousness,
            personnel_cost: self.personnel_cost,
            total_weighted_cost,
            patients_admitted: self.patients_admitted,
            patients_discharged: self.patients_discharged,
            unresolved_pending: self.unresolved_pending,
            unresolved_in_hospital: self.unresolved_in_hospital,
            events,
        })
    }
}

/// Immutable outcome of a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub seed: u64,

    /// Total slots patients spent pending before admission.
    pub waiting_time_for_admission: u64,

    /// Total slots patients spent in hospital, admission to discharge.
    pub waiting_time_in_hospital: u64,

    /// Total nervousness accrued by deferred patients.
    pub nervousness: f64,

    /// Cost of all scheduled staff over the horizon.
    pub personnel_cost: f64,

    /// Weighted combination of the four components.
    pub total_weighted_cost: f64,

    pub patients_admitted: usize,
    pub patients_discharged: usize,

    /// Patients still waiting for admission when the horizon ended.
    pub unresolved_pending: usize,

    /// Patients still in a bed when the horizon ended.
    pub unresolved_in_hospital: usize,

    /// Full event trace of the run.
    pub events: EventLog,
}
