//! Time management for the simulation
//!
//! The simulation operates in discrete slots. Each day is partitioned into
//! four named slots (morning, afternoon, evening, night); the slot is the
//! atomic unit of time advancement. This module provides deterministic time
//! advancement over a bounded horizon.

use crate::core::ConfigError;
use serde::{Deserialize, Serialize};

/// Number of slots in one day.
pub const SLOTS_PER_DAY: usize = 4;

/// One of the four fixed time partitions of a day.
///
/// Slots are ordered within a day: morning < afternoon < evening < night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Slot {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl Slot {
    /// All slots in within-day order.
    pub const ALL: [Slot; SLOTS_PER_DAY] =
        [Slot::Morning, Slot::Afternoon, Slot::Evening, Slot::Night];

    /// Position of this slot within its day (0..4).
    pub fn index(self) -> usize {
        match self {
            Slot::Morning => 0,
            Slot::Afternoon => 1,
            Slot::Evening => 2,
            Slot::Night => 3,
        }
    }

    /// Slot at the given within-day position.
    ///
    /// # Panics
    /// Panics if `index >= SLOTS_PER_DAY`.
    pub fn from_index(index: usize) -> Slot {
        Slot::ALL[index]
    }

    /// Human-readable slot name.
    pub fn label(self) -> &'static str {
        match self {
            Slot::Morning => "morning",
            Slot::Afternoon => "afternoon",
            Slot::Evening => "evening",
            Slot::Night => "night",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A point in simulated time: a (day, slot) pair.
///
/// Totally ordered by the absolute slot index `day * 4 + slot`, so
/// timestamps compare the way the simulation experiences them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotTime {
    pub day: usize,
    pub slot: Slot,
}

impl SlotTime {
    pub fn new(day: usize, slot: Slot) -> Self {
        Self { day, slot }
    }

    /// Absolute slot index since the start of the simulation.
    pub fn absolute(self) -> usize {
        self.day * SLOTS_PER_DAY + self.slot.index()
    }

    /// Inverse of [`SlotTime::absolute`].
    pub fn from_absolute(abs: usize) -> Self {
        Self {
            day: abs / SLOTS_PER_DAY,
            slot: Slot::from_index(abs % SLOTS_PER_DAY),
        }
    }

    /// Number of slots elapsed since `earlier`, saturating at zero.
    pub fn slots_since(self, earlier: SlotTime) -> usize {
        self.absolute().saturating_sub(earlier.absolute())
    }
}

impl PartialOrd for SlotTime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SlotTime {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.absolute().cmp(&other.absolute())
    }
}

impl std::fmt::Display for SlotTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "day {} {}", self.day, self.slot)
    }
}

/// Advances simulated time one slot at a time across a configured horizon.
///
/// The clock is deterministic and has no side effects beyond its own
/// position. It becomes terminal once the position reaches
/// `horizon_days * 4` slots.
///
/// # Example
/// ```
/// use hospital_simulator_core_rs::core::{SimClock, Slot};
///
/// let mut clock = SimClock::new(1).unwrap();
/// assert_eq!(clock.now().slot, Slot::Morning);
/// clock.advance();
/// assert_eq!(clock.now().slot, Slot::Afternoon);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    /// Absolute slot index of the current position.
    current: usize,
    horizon_days: usize,
}

impl SimClock {
    /// Create a clock covering `horizon_days` days.
    ///
    /// A horizon of zero days is rejected with [`ConfigError::InvalidHorizon`].
    pub fn new(horizon_days: usize) -> Result<Self, ConfigError> {
        if horizon_days == 0 {
            return Err(ConfigError::InvalidHorizon);
        }
        Ok(Self {
            current: 0,
            horizon_days,
        })
    }

    /// Current (day, slot) position.
    pub fn now(&self) -> SlotTime {
        SlotTime::from_absolute(self.current)
    }

    /// Move forward one slot.
    pub fn advance(&mut self) {
        self.current += 1;
    }

    /// True once the position has left the configured horizon.
    pub fn is_exhausted(&self) -> bool {
        self.current >= self.total_slots()
    }

    /// Total number of slots in the horizon.
    pub fn total_slots(&self) -> usize {
        self.horizon_days * SLOTS_PER_DAY
    }

    pub fn horizon_days(&self) -> usize {
        self.horizon_days
    }
}
