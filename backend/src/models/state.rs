//! Per-run ward state
//!
//! Owns every patient of one simulation run: the pending queue (arrival
//! order), the discharge calendar for admitted patients, and the patient
//! records themselves. Each run holds its own `WardState`; nothing here is
//! shared between runs.
//!
//! BTreeMaps keep iteration order deterministic, which the replay property
//! depends on.

use crate::models::Patient;
use std::collections::BTreeMap;

/// Mutable simulation state for a single run.
#[derive(Debug, Clone, Default)]
pub struct WardState {
    /// All patients seen this run, by id.
    patients: BTreeMap<usize, Patient>,

    /// Ids of patients awaiting admission, in arrival order.
    pending: Vec<usize>,

    /// Absolute slot index -> patients due for discharge at that slot.
    discharge_due: BTreeMap<usize, Vec<usize>>,

    /// Patients admitted and not yet discharged.
    in_hospital: usize,
}

impl WardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly arrived patient at the back of the pending queue.
    pub fn add_arrival(&mut self, patient: Patient) {
        self.pending.push(patient.id());
        self.patients.insert(patient.id(), patient);
    }

    /// Pending patient ids in arrival order.
    pub fn pending_ids(&self) -> &[usize] {
        &self.pending
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn in_hospital_count(&self) -> usize {
        self.in_hospital
    }

    pub fn num_patients(&self) -> usize {
        self.patients.len()
    }

    pub fn patient(&self, id: usize) -> Option<&Patient> {
        self.patients.get(&id)
    }

    pub fn patient_mut(&mut self, id: usize) -> Option<&mut Patient> {
        self.patients.get_mut(&id)
    }

    /// Move a patient out of the pending queue and schedule their discharge.
    ///
    /// The caller has already set the patient's admission timestamp.
    pub fn mark_admitted(&mut self, id: usize, discharge_slot: usize) {
        self.pending.retain(|&p| p != id);
        self.discharge_due.entry(discharge_slot).or_default().push(id);
        self.in_hospital += 1;
    }

    /// Take the patients due for discharge at the given absolute slot.
    pub fn take_due_discharges(&mut self, abs_slot: usize) -> Vec<usize> {
        let due = self.discharge_due.remove(&abs_slot).unwrap_or_default();
        self.in_hospital -= due.len();
        due
    }

    /// Pending patients as references, in arrival order.
    pub fn pending_patients(&self) -> Vec<&Patient> {
        self.pending
            .iter()
            .filter_map(|id| self.patients.get(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Slot, SlotTime};
    use crate::models::ResourceType;

    fn arrive(state: &mut WardState, id: usize, abs: usize) {
        state.add_arrival(Patient::new(
            id,
            SlotTime::from_absolute(abs),
            2,
            ResourceType::Intake,
            1.0,
        ));
    }

    #[test]
    fn test_pending_keeps_arrival_order() {
        let mut state = WardState::new();
        arrive(&mut state, 3, 0);
        arrive(&mut state, 1, 1);
        arrive(&mut state, 2, 2);
        assert_eq!(state.pending_ids(), &[3, 1, 2]);
    }

    #[test]
    fn test_admission_moves_to_discharge_calendar() {
        let mut state = WardState::new();
        arrive(&mut state, 1, 0);
        arrive(&mut state, 2, 0);

        state
            .patient_mut(1)
            .unwrap()
            .admit(SlotTime::new(0, Slot::Morning), 2)
            .unwrap();
        state.mark_admitted(1, 2);

        assert_eq!(state.pending_ids(), &[2]);
        assert_eq!(state.in_hospital_count(), 1);
        assert_eq!(state.take_due_discharges(2), vec![1]);
        assert_eq!(state.in_hospital_count(), 0);
    }

    #[test]
    fn test_no_discharges_due() {
        let mut state = WardState::new();
        assert!(state.take_due_discharges(5).is_empty());
    }
}
