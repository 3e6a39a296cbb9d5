//! Event logging for traceability and replay verification.
//!
//! Every significant patient state change is appended to the run's
//! [`EventLog`] as an immutable timestamped record. The log is part of the
//! [`RunResult`](crate::metrics::RunResult) and is what the determinism
//! property compares byte-for-byte between runs with the same seed.

use crate::core::SlotTime;
use crate::models::ResourceType;
use serde::{Deserialize, Serialize};

/// An immutable record of a patient state change.
///
/// Deferrals are normal outcomes, not errors: a patient deferred in a slot
/// simply shows up here and accrues nervousness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Patient entered the pending set.
    Arrival {
        time: SlotTime,
        patient_id: usize,
        severity: u8,
        need: ResourceType,
    },

    /// Patient admitted, consuming one unit of `need` capacity this slot.
    Admission {
        time: SlotTime,
        patient_id: usize,
        need: ResourceType,
        waited_slots: usize,
        los_slots: usize,
    },

    /// Patient left pending this slot (no capacity of their type remained).
    Deferral {
        time: SlotTime,
        patient_id: usize,
        need: ResourceType,
    },

    /// Patient left the hospital.
    Discharge {
        time: SlotTime,
        patient_id: usize,
        stay_slots: usize,
    },
}

impl Event {
    /// When the event occurred.
    pub fn time(&self) -> SlotTime {
        match self {
            Event::Arrival { time, .. } => *time,
            Event::Admission { time, .. } => *time,
            Event::Deferral { time, .. } => *time,
            Event::Discharge { time, .. } => *time,
        }
    }

    /// Which patient the event applies to.
    pub fn patient_id(&self) -> usize {
        match self {
            Event::Arrival { patient_id, .. } => *patient_id,
            Event::Admission { patient_id, .. } => *patient_id,
            Event::Deferral { patient_id, .. } => *patient_id,
            Event::Discharge { patient_id, .. } => *patient_id,
        }
    }

    /// Short event kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Arrival { .. } => "arrival",
            Event::Admission { .. } => "admission",
            Event::Deferral { .. } => "deferral",
            Event::Discharge { .. } => "discharge",
        }
    }
}

/// Append-only, time-ordered log of a single run's events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Events of a given kind, in log order.
    pub fn of_kind(&self, kind: &str) -> impl Iterator<Item = &Event> {
        let kind = kind.to_string();
        self.events.iter().filter(move |e| e.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Slot, SlotTime};

    #[test]
    fn test_log_appends_in_order() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.log(Event::Arrival {
            time: SlotTime::new(0, Slot::Morning),
            patient_id: 1,
            severity: 2,
            need: ResourceType::Intake,
        });
        log.log(Event::Admission {
            time: SlotTime::new(0, Slot::Afternoon),
            patient_id: 1,
            need: ResourceType::Intake,
            waited_slots: 1,
            los_slots: 2,
        });

        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].kind(), "arrival");
        assert_eq!(log.events()[1].kind(), "admission");
        assert!(log.events()[0].time() <= log.events()[1].time());
    }

    #[test]
    fn test_of_kind_filters() {
        let mut log = EventLog::new();
        let t = SlotTime::new(0, Slot::Morning);
        log.log(Event::Deferral {
            time: t,
            patient_id: 1,
            need: ResourceType::ABed,
        });
        log.log(Event::Deferral {
            time: t,
            patient_id: 2,
            need: ResourceType::ABed,
        });
        assert_eq!(log.of_kind("deferral").count(), 2);
        assert_eq!(log.of_kind("admission").count(), 0);
    }
}
