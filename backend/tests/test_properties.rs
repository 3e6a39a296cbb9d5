//! Property tests over random seeds and short horizons.

use hospital_simulator_core_rs::core::SlotTime;
use hospital_simulator_core_rs::metrics::RunResult;
use hospital_simulator_core_rs::models::{Event, ResourceType};
use hospital_simulator_core_rs::schedule::ResourceSchedule;
use hospital_simulator_core_rs::simulation::{Simulation, SimulationConfig};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn run(days: usize, seed: u64) -> RunResult {
    Simulation::new(SimulationConfig::new(days, 0, seed))
        .unwrap()
        .run()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_same_seed_same_result(seed in any::<u64>(), days in 1usize..8) {
        prop_assert_eq!(run(days, seed), run(days, seed));
    }

    #[test]
    fn prop_admissions_never_exceed_capacity(seed in any::<u64>(), days in 1usize..6) {
        let result = run(days, seed);
        let schedule = ResourceSchedule::select(0, days).unwrap();

        let mut admitted: BTreeMap<(usize, ResourceType), u32> = BTreeMap::new();
        for event in result.events.of_kind("admission") {
            if let Event::Admission { time, need, .. } = event {
                *admitted.entry((time.absolute(), *need)).or_default() += 1;
            }
        }
        for ((abs, need), count) in admitted {
            let t = SlotTime::from_absolute(abs);
            prop_assert!(
                count <= schedule.capacity(t.day, t.slot, need),
                "slot {} admitted {} {} over capacity", abs, count, need
            );
        }
    }

    #[test]
    fn prop_patient_timestamps_ordered(seed in any::<u64>(), days in 1usize..6) {
        let result = run(days, seed);

        let mut arrivals: BTreeMap<usize, SlotTime> = BTreeMap::new();
        let mut admissions: BTreeMap<usize, SlotTime> = BTreeMap::new();
        for event in result.events.events() {
            match event {
                Event::Arrival { time, patient_id, .. } => {
                    arrivals.insert(*patient_id, *time);
                }
                Event::Admission { time, patient_id, waited_slots, .. } => {
                    let arrived = arrivals[patient_id];
                    prop_assert!(*time >= arrived);
                    prop_assert_eq!(*waited_slots, time.slots_since(arrived));
                    admissions.insert(*patient_id, *time);
                }
                Event::Discharge { time, patient_id, stay_slots } => {
                    let admitted = admissions[patient_id];
                    prop_assert!(*time >= admitted);
                    prop_assert_eq!(*stay_slots, time.slots_since(admitted));
                }
                Event::Deferral { patient_id, .. } => {
                    prop_assert!(arrivals.contains_key(patient_id));
                }
            }
        }
    }

    #[test]
    fn prop_accounting_is_consistent(seed in any::<u64>(), days in 1usize..6) {
        let result = run(days, seed);
        let arrivals = result.events.of_kind("arrival").count();
        let admissions = result.events.of_kind("admission").count();
        let discharges = result.events.of_kind("discharge").count();

        prop_assert_eq!(admissions, result.patients_admitted);
        prop_assert_eq!(discharges, result.patients_discharged);
        // Every arrival either got admitted or is still pending.
        prop_assert_eq!(arrivals, result.patients_admitted + result.unresolved_pending);
        // Every admission either discharged or is still in a bed.
        prop_assert_eq!(
            admissions,
            result.patients_discharged + result.unresolved_in_hospital
        );
        prop_assert!(result.total_weighted_cost >= 3.0 * result.personnel_cost);
    }
}
