//! Resource schedules
//!
//! A [`ResourceSchedule`] describes, per (day, slot), the staffed capacity of
//! each resource type, plus the per-unit personnel cost of keeping that
//! capacity on shift. Schedules are selected by index from a set of named
//! built-in configurations, expanded over the full horizon at selection time,
//! and immutable afterwards — there is no live re-provisioning during a run.
//!
//! Capacity queries beyond the covered horizon return 0 ("resource
//! unavailable that slot") rather than failing. A resource type a
//! configuration does not cover at all is a different matter: routing a
//! patient who needs it is a configuration/data mismatch, surfaced by the
//! allocation policy as a fatal error.

pub mod holidays;

use crate::core::{ConfigError, Slot, SLOTS_PER_DAY};
use crate::models::ResourceType;
use std::collections::BTreeMap;

/// Staffed counts for the four table-driven resource types in one slot.
///
/// ER practitioners are staffed from a demand curve instead, see
/// [`er_practitioners`].
#[derive(Debug, Clone, Copy)]
struct SlotStaffing {
    a_bed: u32,
    b_bed: u32,
    intake: u32,
    operating_room: u32,
}

const fn s(a_bed: u32, b_bed: u32, intake: u32, operating_room: u32) -> SlotStaffing {
    SlotStaffing {
        a_bed,
        b_bed,
        intake,
        operating_room,
    }
}

/// Weekly staffing, Monday first, slots in within-day order.
type WeekTable = [[SlotStaffing; SLOTS_PER_DAY]; 7];

/// Capacity ceilings per resource type; staffing never exceeds these.
const MAX_A_BED: u32 = 30;
const MAX_B_BED: u32 = 40;
const MAX_INTAKE: u32 = 4;
const MAX_OR: u32 = 5;
const MAX_ER: u32 = 9;
const MIN_ER: u32 = 2;

/// Weekly table modeled on average historical resource usage.
#[rustfmt::skip]
const HISTORICAL_AVERAGE: WeekTable = [
    // morning            afternoon           evening             night
    [s(17, 40, 4, 2), s(21, 39, 4, 5), s(24, 40, 2, 3), s(21, 39, 2, 2)], // Monday
    [s(23, 40, 4, 2), s(25, 40, 4, 5), s(26, 40, 3, 3), s(25, 39, 4, 2)], // Tuesday
    [s(27, 40, 4, 2), s(27, 40, 4, 5), s(26, 40, 2, 3), s(27, 40, 4, 2)], // Wednesday
    [s(27, 40, 4, 2), s(27, 40, 4, 5), s(26, 40, 2, 4), s(26, 40, 4, 2)], // Thursday
    [s(26, 40, 4, 2), s(23, 40, 1, 1), s(21, 40, 1, 1), s(27, 40, 4, 2)], // Friday
    [s(16, 40, 4, 1), s(13, 40, 4, 1), s(13, 40, 2, 1), s(20, 40, 2, 2)], // Saturday
    [s( 9, 40, 4, 2), s(14, 39, 4, 5), s(18, 40, 2, 3), s(13, 40, 2, 2)], // Sunday
];

/// Reduced staffing for a clinic that refers surgery elsewhere: no operating
/// rooms at all. Selecting this schedule for a patient mix that produces
/// OR needs is the canonical unroutable-patient misconfiguration.
#[rustfmt::skip]
const LEAN_CLINIC: WeekTable = [
    [s(12, 20, 2, 0), s(12, 20, 2, 0), s(10, 20, 1, 0), s(10, 20, 1, 0)], // Monday
    [s(12, 20, 2, 0), s(12, 20, 2, 0), s(10, 20, 1, 0), s(10, 20, 1, 0)], // Tuesday
    [s(12, 20, 2, 0), s(12, 20, 2, 0), s(10, 20, 1, 0), s(10, 20, 1, 0)], // Wednesday
    [s(12, 20, 2, 0), s(12, 20, 2, 0), s(10, 20, 1, 0), s(10, 20, 1, 0)], // Thursday
    [s(12, 20, 2, 0), s(10, 20, 1, 0), s( 8, 20, 1, 0), s( 8, 20, 1, 0)], // Friday
    [s( 8, 20, 2, 0), s( 8, 20, 2, 0), s( 8, 20, 1, 0), s( 8, 20, 1, 0)], // Saturday
    [s( 8, 20, 2, 0), s( 8, 20, 2, 0), s( 8, 20, 1, 0), s( 8, 20, 1, 0)], // Sunday
];

/// ER practitioner staffing for a slot.
///
/// Collapsed from the original hourly demand curve: evening demand grows
/// steeply (clamped at the ceiling), the night shift carries the overnight
/// case load, daytime runs at the minimum. Holidays raise every shift.
fn er_practitioners(slot: Slot, holiday: bool) -> u32 {
    let amount = match (slot, holiday) {
        (Slot::Morning, false) | (Slot::Afternoon, false) => 2,
        (Slot::Morning, true) | (Slot::Afternoon, true) => 4,
        (Slot::Evening, _) => 9,
        (Slot::Night, false) => 5,
        (Slot::Night, true) => 9,
    };
    amount.clamp(MIN_ER, MAX_ER)
}

/// Apply holiday reductions and capacity ceilings to a base staffing entry.
fn adjusted(base: SlotStaffing, holiday: bool) -> SlotStaffing {
    let mut entry = base;
    if holiday {
        entry.operating_room = ((entry.operating_room as f64 * 0.5).ceil() as u32).max(1);
        entry.a_bed = (entry.a_bed as f64 * 0.8).round() as u32;
        entry.b_bed = (entry.b_bed as f64 * 0.8).round() as u32;
        entry.intake = 1;
    }
    SlotStaffing {
        a_bed: entry.a_bed.min(MAX_A_BED),
        b_bed: entry.b_bed.min(MAX_B_BED),
        intake: entry.intake.min(MAX_INTAKE),
        operating_room: entry.operating_room.min(MAX_OR),
    }
}

/// Default personnel cost per staffed unit per slot.
fn default_unit_costs(types: &[ResourceType]) -> BTreeMap<ResourceType, f64> {
    types
        .iter()
        .map(|&t| {
            let cost = match t {
                ResourceType::Intake => 3.0,
                ResourceType::ABed => 2.0,
                ResourceType::BBed => 1.5,
                ResourceType::OperatingRoom => 10.0,
                ResourceType::ErPractitioner => 5.0,
            };
            (t, cost)
        })
        .collect()
}

/// An immutable capacity table for a full simulation horizon.
///
/// Built once at run construction; shared read-only semantics after that
/// (safe to clone across parallel workers).
#[derive(Debug, Clone)]
pub struct ResourceSchedule {
    name: String,
    horizon_days: usize,
    /// Per covered type: capacity for every absolute slot of the horizon.
    caps: BTreeMap<ResourceType, Vec<u32>>,
    /// Personnel cost per staffed unit per slot.
    unit_costs: BTreeMap<ResourceType, f64>,
}

impl ResourceSchedule {
    /// Number of built-in configurations selectable by index.
    pub fn num_configurations() -> usize {
        2
    }

    /// Select a built-in configuration and expand it over the horizon.
    ///
    /// Index 0 is `historical-average` (covers all resource types), index 1
    /// is `lean-clinic` (no operating rooms). Unknown indices fail with
    /// [`ConfigError::UnknownScheduleIndex`].
    pub fn select(index: usize, horizon_days: usize) -> Result<Self, ConfigError> {
        if horizon_days == 0 {
            return Err(ConfigError::InvalidHorizon);
        }
        let (name, week, covers_or) = match index {
            0 => ("historical-average", &HISTORICAL_AVERAGE, true),
            1 => ("lean-clinic", &LEAN_CLINIC, false),
            _ => {
                return Err(ConfigError::UnknownScheduleIndex {
                    index,
                    available: Self::num_configurations(),
                })
            }
        };

        let mut covered = vec![
            ResourceType::Intake,
            ResourceType::ABed,
            ResourceType::BBed,
            ResourceType::ErPractitioner,
        ];
        if covers_or {
            covered.push(ResourceType::OperatingRoom);
        }

        let total_slots = horizon_days * SLOTS_PER_DAY;
        let mut caps: BTreeMap<ResourceType, Vec<u32>> = covered
            .iter()
            .map(|&t| (t, Vec::with_capacity(total_slots)))
            .collect();

        for day in 0..horizon_days {
            let holiday = holidays::is_holiday(day);
            let weekday = day % 7; // day 0 is a Monday
            for slot in Slot::ALL {
                let entry = adjusted(week[weekday][slot.index()], holiday);
                for (&rtype, column) in caps.iter_mut() {
                    let cap = match rtype {
                        ResourceType::Intake => entry.intake,
                        ResourceType::ABed => entry.a_bed,
                        ResourceType::BBed => entry.b_bed,
                        ResourceType::OperatingRoom => entry.operating_room,
                        ResourceType::ErPractitioner => er_practitioners(slot, holiday),
                    };
                    column.push(cap);
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            horizon_days,
            unit_costs: default_unit_costs(&covered),
            caps,
        })
    }

    /// Build a schedule from an explicit per-slot capacity table.
    ///
    /// Used for what-if experiments and tests. Each column's length defines
    /// how many slots that type covers; queries past it return 0.
    pub fn from_capacity_table(
        name: impl Into<String>,
        horizon_days: usize,
        caps: BTreeMap<ResourceType, Vec<u32>>,
        unit_costs: BTreeMap<ResourceType, f64>,
    ) -> Self {
        Self {
            name: name.into(),
            horizon_days,
            caps,
            unit_costs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn horizon_days(&self) -> usize {
        self.horizon_days
    }

    /// Staffed capacity of `rtype` in the given slot.
    ///
    /// Slots beyond the table's coverage (or types the configuration does
    /// not cover) yield 0.
    pub fn capacity(&self, day: usize, slot: Slot, rtype: ResourceType) -> u32 {
        let abs = day * SLOTS_PER_DAY + slot.index();
        self.caps
            .get(&rtype)
            .and_then(|column| column.get(abs))
            .copied()
            .unwrap_or(0)
    }

    /// Whether this configuration staffs `rtype` at all.
    pub fn covers(&self, rtype: ResourceType) -> bool {
        self.caps.contains_key(&rtype)
    }

    /// Resource types this configuration staffs.
    pub fn covered_types(&self) -> impl Iterator<Item = ResourceType> + '_ {
        self.caps.keys().copied()
    }

    /// Personnel cost of the staffed capacity in the given slot.
    pub fn staffing_cost(&self, day: usize, slot: Slot) -> f64 {
        self.caps
            .keys()
            .map(|&t| {
                let units = self.capacity(day, slot, t) as f64;
                units * self.unit_costs.get(&t).copied().unwrap_or(0.0)
            })
            .sum()
    }
}
