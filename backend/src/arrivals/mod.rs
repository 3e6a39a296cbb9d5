//! Patient arrival generation
//!
//! Produces, for each (day, slot), a possibly empty batch of new patients
//! with randomly drawn severity, resource need and nervousness growth rate.
//! Generation is deterministic from the run seed and independent of
//! allocation outcomes: the model owns its own RNG stream, so admitting more
//! or fewer patients never changes who arrives next (organic demand, not
//! demand response).
//!
//! An arrival source is a lazy, finite, single pass over the horizon: once a
//! slot has been consumed it cannot be consumed again, and replaying a run
//! requires a fresh instance with the same seed.

use crate::core::{ConfigError, SlotTime, SLOTS_PER_DAY};
use crate::models::{Patient, ResourceType};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Configuration for the random arrival model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalConfig {
    /// Expected arrivals per slot (Poisson lambda), indexed by slot kind.
    /// Demand is evening-heavy, mirroring the ER load curve.
    pub slot_rates: [f64; SLOTS_PER_DAY],

    /// Relative weight of each resource need among new patients.
    pub need_weights: Vec<(ResourceType, f64)>,

    /// Relative weight of severities 1..=5.
    pub severity_weights: [f64; 5],

    /// Per-slot nervousness growth rate is drawn uniformly from this range.
    pub nervousness_rate_range: (f64, f64),
}

impl ArrivalConfig {
    /// Check that the distributions can actually be sampled from.
    ///
    /// The RNG's weighted sampler treats empty or zero-mass weight tables as
    /// a caller bug; run construction rejects such configs here instead of
    /// panicking slots into the run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidArrivalConfig {
            reason: reason.to_string(),
        };
        if !self.need_weights.iter().any(|(_, w)| *w > 0.0) {
            return Err(invalid("need_weights must have positive mass"));
        }
        if !self.severity_weights.iter().any(|w| *w > 0.0) {
            return Err(invalid("severity_weights must have positive mass"));
        }
        if self.slot_rates.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(invalid("slot_rates must be finite and non-negative"));
        }
        let (lo, hi) = self.nervousness_rate_range;
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(invalid(
                "nervousness_rate_range must be a finite ordered range",
            ));
        }
        Ok(())
    }
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self {
            // morning, afternoon, evening, night
            slot_rates: [1.2, 1.5, 2.5, 0.8],
            need_weights: vec![
                (ResourceType::Intake, 4.0),
                (ResourceType::ABed, 2.0),
                (ResourceType::BBed, 2.0),
                (ResourceType::OperatingRoom, 1.0),
                (ResourceType::ErPractitioner, 1.5),
            ],
            severity_weights: [0.30, 0.30, 0.20, 0.15, 0.05],
            nervousness_rate_range: (0.5, 1.5),
        }
    }
}

/// Source of per-slot patient arrivals for one run.
///
/// Called exactly once per slot, in slot order, by the run loop. Returns
/// `None` once the horizon is exhausted.
pub trait ArrivalSource: Send {
    fn next_slot(&mut self) -> Option<Vec<Patient>>;
}

/// Seeded random arrival model.
pub struct PatientArrivals {
    config: ArrivalConfig,
    rng: RngManager,
    /// Absolute slot index of the next slot to generate.
    cursor: usize,
    total_slots: usize,
    next_patient_id: usize,
}

impl PatientArrivals {
    /// Stream id for the arrival RNG, distinct from the engine's draws.
    const RNG_STREAM: u64 = 0;

    pub fn new(config: ArrivalConfig, seed: u64, horizon_days: usize) -> Self {
        Self {
            config,
            rng: RngManager::for_stream(seed, Self::RNG_STREAM),
            cursor: 0,
            total_slots: horizon_days * SLOTS_PER_DAY,
            next_patient_id: 0,
        }
    }

    fn draw_patient(&mut self, time: SlotTime) -> Patient {
        let severity = 1 + self.rng.weighted(&self.config.severity_weights) as u8;

        let weights: Vec<f64> = self.config.need_weights.iter().map(|(_, w)| *w).collect();
        let need = self.config.need_weights[self.rng.weighted(&weights)].0;

        let (lo, hi) = self.config.nervousness_rate_range;
        let nervousness_rate = self.rng.uniform(lo, hi);

        let id = self.next_patient_id;
        self.next_patient_id += 1;
        Patient::new(id, time, severity, need, nervousness_rate)
    }
}

impl ArrivalSource for PatientArrivals {
    fn next_slot(&mut self) -> Option<Vec<Patient>> {
        if self.cursor >= self.total_slots {
            return None;
        }
        let time = SlotTime::from_absolute(self.cursor);
        self.cursor += 1;

        let lambda = self.config.slot_rates[time.slot.index()];
        let count = self.rng.poisson(lambda);
        let batch = (0..count).map(|_| self.draw_patient(time)).collect();
        Some(batch)
    }
}

/// Predetermined arrivals, one batch per slot.
///
/// Lets tests and replay scenarios drive the engine with exact patients
/// instead of random draws.
pub struct ScriptedArrivals {
    slots: std::collections::VecDeque<Vec<Patient>>,
}

impl ScriptedArrivals {
    pub fn new(slots: Vec<Vec<Patient>>) -> Self {
        Self {
            slots: slots.into(),
        }
    }

    /// A script with no arrivals at all for the given horizon.
    pub fn empty(horizon_days: usize) -> Self {
        Self::new(vec![Vec::new(); horizon_days * SLOTS_PER_DAY])
    }
}

impl ArrivalSource for ScriptedArrivals {
    fn next_slot(&mut self) -> Option<Vec<Patient>> {
        self.slots.pop_front()
    }
}
