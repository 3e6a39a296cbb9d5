//! Greedy priority allocation
//!
//! Ranks the pending set by a weighted priority score and admits patients in
//! that order while capacity of their needed type remains. Deferred patients
//! stay pending and are reconsidered next slot with a higher waiting term,
//! so nobody starves under the default weights.

use crate::core::SlotTime;
use crate::models::{Patient, ResourceType};
use crate::policy::{AllocationDecision, AllocationError, AllocationPolicy, PriorityWeights};
use std::collections::BTreeMap;

/// Highest-priority-first admission within per-type capacity.
///
/// # Example
///
/// ```
/// use hospital_simulator_core_rs::core::{Slot, SlotTime};
/// use hospital_simulator_core_rs::models::{Patient, ResourceType};
/// use hospital_simulator_core_rs::policy::{AllocationPolicy, GreedyPriorityPolicy, PriorityWeights};
/// use std::collections::BTreeMap;
///
/// let now = SlotTime::new(0, Slot::Morning);
/// let patient = Patient::new(0, now, 3, ResourceType::Intake, 1.0);
/// let mut remaining = BTreeMap::from([(ResourceType::Intake, 1u32)]);
///
/// let mut policy = GreedyPriorityPolicy::new(PriorityWeights::default());
/// let decisions = policy.allocate(&[&patient], &mut remaining, now).unwrap();
/// assert_eq!(decisions.len(), 1);
/// assert_eq!(remaining[&ResourceType::Intake], 0);
/// ```
#[derive(Debug, Clone)]
pub struct GreedyPriorityPolicy {
    weights: PriorityWeights,
}

impl GreedyPriorityPolicy {
    pub fn new(weights: PriorityWeights) -> Self {
        Self { weights }
    }

    fn score(&self, patient: &Patient, now: SlotTime) -> f64 {
        self.weights.waiting * patient.waited_slots(now) as f64
            + self.weights.severity * f64::from(patient.severity())
    }
}

impl AllocationPolicy for GreedyPriorityPolicy {
    fn allocate(
        &mut self,
        pending: &[&Patient],
        remaining: &mut BTreeMap<ResourceType, u32>,
        now: SlotTime,
    ) -> Result<Vec<AllocationDecision>, AllocationError> {
        let mut ranked: Vec<&Patient> = pending.to_vec();
        // Highest score first; ties go to the earlier arrival, then the
        // lower id, so ranking is total and replayable.
        ranked.sort_by(|a, b| {
            self.score(b, now)
                .total_cmp(&self.score(a, now))
                .then_with(|| a.arrived_at().cmp(&b.arrived_at()))
                .then_with(|| a.id().cmp(&b.id()))
        });

        let mut decisions = Vec::with_capacity(ranked.len());
        for patient in ranked {
            let need = patient.need();
            let free = remaining
                .get_mut(&need)
                .ok_or(AllocationError::UnroutablePatient {
                    patient_id: patient.id(),
                    need,
                })?;
            if *free > 0 {
                *free -= 1;
                decisions.push(AllocationDecision::Admit {
                    patient_id: patient.id(),
                    need,
                });
            } else {
                decisions.push(AllocationDecision::Defer {
                    patient_id: patient.id(),
                    need,
                });
            }
        }
        Ok(decisions)
    }
}
