//! Patient model
//!
//! A patient is created on arrival, mutated by the allocation heuristic
//! (admission, length-of-stay draw) and by clock advancement (nervousness
//! accrual while pending), and leaves the active set on discharge.
//!
//! Timestamp invariants are enforced here and surface as [`PatientError`]s:
//! admission never precedes arrival, discharge never precedes admission.

use crate::core::SlotTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A resource/staff type responsible for processing admissions.
///
/// Capacity-limited per slot by the [`ResourceSchedule`](crate::schedule::ResourceSchedule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Intake,
    ABed,
    BBed,
    OperatingRoom,
    ErPractitioner,
}

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Intake,
        ResourceType::ABed,
        ResourceType::BBed,
        ResourceType::OperatingRoom,
        ResourceType::ErPractitioner,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResourceType::Intake => "INTAKE",
            ResourceType::ABed => "A_BED",
            ResourceType::BBed => "B_BED",
            ResourceType::OperatingRoom => "OR",
            ResourceType::ErPractitioner => "ER_PRACTITIONER",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors from patient lifecycle operations.
///
/// These are contract violations, not normal outcomes; the engine never
/// produces them on a valid schedule, and they always propagate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatientError {
    #[error("patient {patient_id} already admitted")]
    AlreadyAdmitted { patient_id: usize },

    #[error("patient {patient_id} admitted at {admitted} before arrival at {arrived}")]
    AdmissionBeforeArrival {
        patient_id: usize,
        arrived: SlotTime,
        admitted: SlotTime,
    },

    #[error("patient {patient_id} not admitted, cannot discharge")]
    NotAdmitted { patient_id: usize },

    #[error("patient {patient_id} discharged at {discharged} before admission at {admitted}")]
    DischargeBeforeAdmission {
        patient_id: usize,
        admitted: SlotTime,
        discharged: SlotTime,
    },
}

/// A patient competing for admission capacity.
///
/// Severity is 1..=5 (5 = most severe); `nervousness_rate` is the per-slot
/// penalty accrued while the patient waits unadmitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    id: usize,
    arrived_at: SlotTime,
    severity: u8,
    need: ResourceType,
    nervousness_rate: f64,
    nervousness: f64,
    admitted_at: Option<SlotTime>,
    discharged_at: Option<SlotTime>,
    /// Length of stay in slots, drawn at admission time.
    los_slots: Option<usize>,
}

impl Patient {
    pub fn new(
        id: usize,
        arrived_at: SlotTime,
        severity: u8,
        need: ResourceType,
        nervousness_rate: f64,
    ) -> Self {
        debug_assert!((1..=5).contains(&severity), "severity must be 1..=5");
        Self {
            id,
            arrived_at,
            severity,
            need,
            nervousness_rate,
            nervousness: 0.0,
            admitted_at: None,
            discharged_at: None,
            los_slots: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn arrived_at(&self) -> SlotTime {
        self.arrived_at
    }

    pub fn severity(&self) -> u8 {
        self.severity
    }

    pub fn need(&self) -> ResourceType {
        self.need
    }

    pub fn nervousness_rate(&self) -> f64 {
        self.nervousness_rate
    }

    /// Nervousness accumulated so far; non-decreasing while pending.
    pub fn nervousness(&self) -> f64 {
        self.nervousness
    }

    pub fn admitted_at(&self) -> Option<SlotTime> {
        self.admitted_at
    }

    pub fn discharged_at(&self) -> Option<SlotTime> {
        self.discharged_at
    }

    pub fn los_slots(&self) -> Option<usize> {
        self.los_slots
    }

    pub fn is_pending(&self) -> bool {
        self.admitted_at.is_none()
    }

    pub fn is_in_hospital(&self) -> bool {
        self.admitted_at.is_some() && self.discharged_at.is_none()
    }

    /// Slots this patient has waited for admission as of `now`.
    pub fn waited_slots(&self, now: SlotTime) -> usize {
        now.slots_since(self.arrived_at)
    }

    /// Accrue one slot of nervousness growth; returns the delta added.
    pub fn accrue_nervousness(&mut self) -> f64 {
        self.nervousness += self.nervousness_rate;
        self.nervousness_rate
    }

    /// Admit the patient at `at` with the drawn length of stay.
    pub fn admit(&mut self, at: SlotTime, los_slots: usize) -> Result<(), PatientError> {
        if self.admitted_at.is_some() {
            return Err(PatientError::AlreadyAdmitted { patient_id: self.id });
        }
        if at < self.arrived_at {
            return Err(PatientError::AdmissionBeforeArrival {
                patient_id: self.id,
                arrived: self.arrived_at,
                admitted: at,
            });
        }
        self.admitted_at = Some(at);
        self.los_slots = Some(los_slots);
        Ok(())
    }

    /// Discharge the patient at `at`.
    pub fn discharge(&mut self, at: SlotTime) -> Result<(), PatientError> {
        let admitted = self
            .admitted_at
            .ok_or(PatientError::NotAdmitted { patient_id: self.id })?;
        if at < admitted {
            return Err(PatientError::DischargeBeforeAdmission {
                patient_id: self.id,
                admitted,
                discharged: at,
            });
        }
        self.discharged_at = Some(at);
        Ok(())
    }
}
