//! Domain types: patients, resource types, events, per-run ward state.

pub mod event;
pub mod patient;
pub mod state;

pub use event::{Event, EventLog};
pub use patient::{Patient, PatientError, ResourceType};
pub use state::WardState;
