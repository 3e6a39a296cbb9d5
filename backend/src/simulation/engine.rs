//! The per-slot run loop.

use crate::arrivals::{ArrivalSource, PatientArrivals};
use crate::core::{SimClock, SlotTime};
use crate::metrics::{MetricsAccumulator, RunResult};
use crate::models::{Event, EventLog, ResourceType, WardState};
use crate::orchestrator::CancelToken;
use crate::policy::{AllocationDecision, AllocationPolicy, GreedyPriorityPolicy};
use crate::rng::RngManager;
use crate::schedule::ResourceSchedule;
use crate::simulation::{LosConfig, SimulationConfig, SimulationError};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Stream id for the engine's own draws (length of stay), distinct from the
/// arrival model's stream so arrivals never depend on allocation outcomes.
const ENGINE_RNG_STREAM: u64 = 1;

/// One seeded simulation run.
///
/// # Example
///
/// ```
/// use hospital_simulator_core_rs::simulation::{Simulation, SimulationConfig};
///
/// let config = SimulationConfig::new(7, 0, 42);
/// let result = Simulation::new(config).unwrap().run().unwrap();
/// assert_eq!(result.seed, 42);
/// ```
pub struct Simulation {
    clock: SimClock,
    schedule: ResourceSchedule,
    arrivals: Box<dyn ArrivalSource>,
    policy: Box<dyn AllocationPolicy>,
    metrics: MetricsAccumulator,
    state: WardState,
    events: EventLog,
    rng: RngManager,
    los: LosConfig,
    seed: u64,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Bind all components for one run of `config`.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.arrival_config.validate()?;
        let clock = SimClock::new(config.horizon_days)?;
        let schedule = ResourceSchedule::select(config.schedule_index, config.horizon_days)?;
        let arrivals = Box::new(PatientArrivals::new(
            config.arrival_config.clone(),
            config.rng_seed,
            config.horizon_days,
        ));
        let policy = Box::new(GreedyPriorityPolicy::new(config.priority_weights));
        Ok(Self::assemble(
            clock,
            schedule,
            arrivals,
            policy,
            MetricsAccumulator::new(config.cost_weights),
            config.los,
            config.rng_seed,
        ))
    }

    /// Bind explicit components, bypassing the built-in schedule and the
    /// random arrival model. This is the seam scripted scenarios drive.
    pub fn with_components(
        schedule: ResourceSchedule,
        arrivals: Box<dyn ArrivalSource>,
        policy: Box<dyn AllocationPolicy>,
        metrics: MetricsAccumulator,
        los: LosConfig,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        let clock = SimClock::new(schedule.horizon_days())?;
        Ok(Self::assemble(
            clock, schedule, arrivals, policy, metrics, los, seed,
        ))
    }

    fn assemble(
        clock: SimClock,
        schedule: ResourceSchedule,
        arrivals: Box<dyn ArrivalSource>,
        policy: Box<dyn AllocationPolicy>,
        metrics: MetricsAccumulator,
        los: LosConfig,
        seed: u64,
    ) -> Self {
        Self {
            clock,
            schedule,
            arrivals,
            policy,
            metrics,
            state: WardState::new(),
            events: EventLog::new(),
            rng: RngManager::for_stream(seed, ENGINE_RNG_STREAM),
            los,
            seed,
        }
    }

    /// Run to the horizon. Consumes the simulation; a finalized run cannot
    /// be re-entered.
    pub fn run(self) -> Result<RunResult, SimulationError> {
        self.run_with_cancel(&CancelToken::new())
    }

    /// Run to the horizon, checking `cancel` once per slot.
    pub fn run_with_cancel(mut self, cancel: &CancelToken) -> Result<RunResult, SimulationError> {
        info!(
            seed = self.seed,
            horizon_days = self.clock.horizon_days(),
            schedule = self.schedule.name(),
            "starting run"
        );

        while !self.clock.is_exhausted() {
            if cancel.is_cancelled() {
                debug!(seed = self.seed, slot = ?self.clock.now(), "run cancelled");
                return Err(SimulationError::Cancelled);
            }
            let now = self.clock.now();
            self.process_discharges(now)?;
            self.ingest_arrivals(now);
            self.allocate_slot(now)?;
            self.metrics
                .accrue_staffing(self.schedule.staffing_cost(now.day, now.slot))?;
            self.clock.advance();
        }

        // Stays ending exactly on the horizon boundary still complete.
        let boundary = SlotTime::from_absolute(self.clock.total_slots());
        self.process_discharges(boundary)?;

        self.metrics
            .record_unresolved(self.state.pending_count(), self.state.in_hospital_count())?;
        let result = self.metrics.finalize(self.events, self.seed)?;

        info!(
            seed = self.seed,
            total_weighted_cost = result.total_weighted_cost,
            admitted = result.patients_admitted,
            discharged = result.patients_discharged,
            "run finished"
        );
        Ok(result)
    }

    fn process_discharges(&mut self, now: SlotTime) -> Result<(), SimulationError> {
        for id in self.state.take_due_discharges(now.absolute()) {
            let patient = self
                .state
                .patient_mut(id)
                .ok_or(SimulationError::Patient(
                    crate::models::PatientError::NotAdmitted { patient_id: id },
                ))?;
            patient.discharge(now)?;
            let stay = now.slots_since(patient.admitted_at().unwrap_or(now));
            self.metrics.observe_discharge(stay)?;
            self.events.log(Event::Discharge {
                time: now,
                patient_id: id,
                stay_slots: stay,
            });
        }
        Ok(())
    }

    fn ingest_arrivals(&mut self, now: SlotTime) {
        let Some(batch) = self.arrivals.next_slot() else {
            return;
        };
        for patient in batch {
            self.events.log(Event::Arrival {
                time: now,
                patient_id: patient.id(),
                severity: patient.severity(),
                need: patient.need(),
            });
            self.state.add_arrival(patient);
        }
    }

    fn allocate_slot(&mut self, now: SlotTime) -> Result<(), SimulationError> {
        let mut remaining = self.remaining_capacity(now);
        let pending = self.state.pending_patients();
        let decisions = self.policy.allocate(&pending, &mut remaining, now)?;

        for decision in decisions {
            match decision {
                AllocationDecision::Admit { patient_id, need } => {
                    self.admit_patient(patient_id, need, now)?;
                }
                AllocationDecision::Defer { patient_id, need } => {
                    if let Some(patient) = self.state.patient_mut(patient_id) {
                        let delta = patient.accrue_nervousness();
                        self.metrics.accrue_nervousness(delta)?;
                    }
                    self.events.log(Event::Deferral {
                        time: now,
                        patient_id,
                        need,
                    });
                }
            }
        }
        Ok(())
    }

    fn admit_patient(
        &mut self,
        patient_id: usize,
        need: ResourceType,
        now: SlotTime,
    ) -> Result<(), SimulationError> {
        let los = self.draw_los(patient_id);
        let patient = self
            .state
            .patient_mut(patient_id)
            .ok_or(SimulationError::Patient(
                crate::models::PatientError::NotAdmitted { patient_id },
            ))?;
        let waited = patient.waited_slots(now);
        patient.admit(now, los)?;
        self.metrics.observe_admission(waited)?;
        self.state.mark_admitted(patient_id, now.absolute() + los);
        self.events.log(Event::Admission {
            time: now,
            patient_id,
            need,
            waited_slots: waited,
            los_slots: los,
        });
        Ok(())
    }

    /// Length of stay for the patient being admitted, at least one slot.
    fn draw_los(&mut self, patient_id: usize) -> usize {
        let severity = self
            .state
            .patient(patient_id)
            .map(|p| p.severity() as usize)
            .unwrap_or(1);
        let jitter = self.rng.range(0, self.los.jitter_slots as i64 + 1) as usize;
        (self.los.base_slots + self.los.per_severity_slots * severity + jitter).max(1)
    }

    fn remaining_capacity(&self, now: SlotTime) -> BTreeMap<ResourceType, u32> {
        self.schedule
            .covered_types()
            .map(|t| (t, self.schedule.capacity(now.day, now.slot, t)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrivals::ScriptedArrivals;
    use crate::metrics::CostWeights;
    use crate::models::Patient;
    use crate::policy::PriorityWeights;
    use crate::schedule::ResourceSchedule;

    fn fixed_los() -> LosConfig {
        LosConfig {
            base_slots: 1,
            per_severity_slots: 0,
            jitter_slots: 0,
        }
    }

    fn intake_only(horizon_days: usize, caps: Vec<u32>) -> ResourceSchedule {
        ResourceSchedule::from_capacity_table(
            "intake-only",
            horizon_days,
            BTreeMap::from([(ResourceType::Intake, caps)]),
            BTreeMap::from([(ResourceType::Intake, 1.0)]),
        )
    }

    fn sim_with(
        schedule: ResourceSchedule,
        script: Vec<Vec<Patient>>,
    ) -> Simulation {
        Simulation::with_components(
            schedule,
            Box::new(ScriptedArrivals::new(script)),
            Box::new(GreedyPriorityPolicy::new(PriorityWeights::default())),
            MetricsAccumulator::new(CostWeights::default()),
            fixed_los(),
            7,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_run_has_no_patient_events() {
        let schedule = intake_only(1, vec![1, 1, 1, 1]);
        let result = sim_with(schedule, vec![vec![]; 4]).run().unwrap();
        assert!(result.events.is_empty());
        assert_eq!(result.patients_admitted, 0);
        assert_eq!(result.waiting_time_for_admission, 0);
        // Staffing still costs money with nobody to treat.
        assert!(result.personnel_cost > 0.0);
    }

    #[test]
    fn test_admission_waits_and_discharges() {
        // One patient, admitted immediately, stays one slot.
        let schedule = intake_only(1, vec![1, 1, 1, 1]);
        let p = Patient::new(0, SlotTime::from_absolute(0), 2, ResourceType::Intake, 1.0);
        let result = sim_with(schedule, vec![vec![p], vec![], vec![], vec![]])
            .run()
            .unwrap();

        assert_eq!(result.patients_admitted, 1);
        assert_eq!(result.patients_discharged, 1);
        assert_eq!(result.waiting_time_for_admission, 0);
        assert_eq!(result.waiting_time_in_hospital, 1);
        assert_eq!(result.unresolved_pending, 0);
        assert_eq!(result.unresolved_in_hospital, 0);
        assert_eq!(result.events.of_kind("discharge").count(), 1);
    }

    #[test]
    fn test_cancel_before_first_slot() {
        let schedule = intake_only(1, vec![1, 1, 1, 1]);
        let sim = sim_with(schedule, vec![vec![]; 4]);
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(sim.run_with_cancel(&token), Err(SimulationError::Cancelled));
    }

    #[test]
    fn test_unsampleable_weights_rejected_at_construction() {
        let mut config = SimulationConfig::new(2, 0, 1);
        config.arrival_config.severity_weights = [0.0; 5];
        let err = Simulation::new(config).unwrap_err();
        assert!(matches!(err, SimulationError::Config(_)));

        let mut config = SimulationConfig::new(2, 0, 1);
        config.arrival_config.need_weights.clear();
        assert!(matches!(
            Simulation::new(config).unwrap_err(),
            SimulationError::Config(_)
        ));
    }

    #[test]
    fn test_unresolved_counted_at_horizon() {
        // No capacity at all: the patient waits forever and ends unresolved.
        let schedule = intake_only(1, vec![0, 0, 0, 0]);
        let p = Patient::new(0, SlotTime::from_absolute(0), 3, ResourceType::Intake, 0.5);
        let result = sim_with(schedule, vec![vec![p], vec![], vec![], vec![]])
            .run()
            .unwrap();

        assert_eq!(result.patients_admitted, 0);
        assert_eq!(result.unresolved_pending, 1);
        assert_eq!(result.events.of_kind("deferral").count(), 4);
        // Four deferrals at rate 0.5.
        assert!((result.nervousness - 2.0).abs() < 1e-9);
    }
}
