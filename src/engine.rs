//! Daily tick pipeline.
//!
//! A tick runs these phases in a fixed order so that the same draws always
//! produce the same results:
//!
//! ```text
//! 1. day += 1
//! 2. drought decay (water, food)
//! 3. conflict check          (1 draw)
//! 4. random event check      (1 draw, +1 to pick the event)
//! 5. displacement
//! 6. natural recovery
//! 7. interventions countdown, effects, expiry
//! 8. terminal check
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{check_unit_interval, SimError};
use crate::event::SimEvent;
use crate::rng::RandomSource;
use crate::state::{SimulationSnapshot, SimulationState};
use crate::systems::{
    ConflictSystem, DisplacementSystem, DroughtSystem, InterventionSystem, RandomEventSystem,
    RecoverySystem,
};

pub struct TickContext {
    pub day: u32,
    pub conflict_probability: f64,
}

pub trait System: Send {
    fn name(&self) -> &'static str;
    fn run(
        &mut self,
        ctx: &TickContext,
        state: &mut SimulationState,
        rng: &mut dyn RandomSource,
        events: &mut Vec<SimEvent>,
    );
}

/// Result of one call to [`CrisisEngine::step`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub snapshot: SimulationSnapshot,
    pub events: Vec<SimEvent>,
    /// False when the state was already terminal and nothing changed.
    pub advanced: bool,
}

pub struct CrisisEngine {
    systems: Vec<Box<dyn System>>,
}

impl CrisisEngine {
    pub fn new() -> Self {
        Self {
            systems: vec![
                Box::new(DroughtSystem::new()),
                Box::new(ConflictSystem::new()),
                Box::new(RandomEventSystem::new()),
                Box::new(DisplacementSystem::new()),
                Box::new(RecoverySystem::new()),
                Box::new(InterventionSystem::new()),
            ],
        }
    }

    pub fn phase_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|system| system.name()).collect()
    }

    /// Advances `state` by one day.
    ///
    /// A terminal state is returned unchanged with `advanced == false`,
    /// whatever the inputs. Otherwise an out-of-range `conflict_probability`
    /// is rejected before anything is mutated.
    pub fn step(
        &mut self,
        state: &mut SimulationState,
        rng: &mut dyn RandomSource,
        conflict_probability: f64,
    ) -> Result<TickReport, SimError> {
        if state.is_terminal() {
            return Ok(TickReport {
                snapshot: state.snapshot(),
                events: Vec::new(),
                advanced: false,
            });
        }
        if !check_unit_interval(conflict_probability) {
            return Err(SimError::InvalidConflictProbability(conflict_probability));
        }

        state.day += 1;
        let ctx = TickContext {
            day: state.day,
            conflict_probability,
        };
        let mut events = Vec::new();
        for system in self.systems.iter_mut() {
            system.run(&ctx, state, rng, &mut events);
        }

        if state.is_terminal() {
            let terminal = if state.population == 0 {
                SimEvent::PopulationDisplaced
            } else {
                SimEvent::PeriodEnded
            };
            info!(
                day = state.day,
                population = state.population,
                displaced = state.displaced_population,
                "simulation reached terminal state: {terminal}"
            );
            events.push(terminal);
        }

        debug!(
            day = state.day,
            population = state.population,
            displaced = state.displaced_population,
            food = state.food_supply,
            water = state.water_access,
            security = state.security_level,
            events = events.len(),
            "tick complete"
        );

        Ok(TickReport {
            snapshot: state.snapshot(),
            events,
            advanced: true,
        })
    }
}

impl Default for CrisisEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::InterventionKind;
    use crate::rng::SequenceRandom;

    #[test]
    fn phases_run_in_fixed_order() {
        let engine = CrisisEngine::new();
        assert_eq!(
            engine.phase_names(),
            vec![
                "drought",
                "conflict",
                "random_events",
                "displacement",
                "recovery",
                "interventions"
            ]
        );
    }

    #[test]
    fn step_increments_day_once() {
        let mut engine = CrisisEngine::new();
        let mut state = SimulationState::new(1_000, 0.2).unwrap();
        let mut rng = SequenceRandom::new(vec![0.99]);
        let report = engine.step(&mut state, &mut rng, 0.4).unwrap();
        assert!(report.advanced);
        assert_eq!(report.snapshot.day, 1);
        assert_eq!(state.day(), 1);
        // conflict draw + event draw
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn rejects_bad_conflict_probability() {
        let mut engine = CrisisEngine::new();
        let mut state = SimulationState::new(1_000, 0.2).unwrap();
        let before = state.clone();
        let mut rng = SequenceRandom::new(vec![0.5]);
        let err = engine.step(&mut state, &mut rng, 1.2).unwrap_err();
        assert_eq!(err, SimError::InvalidConflictProbability(1.2));
        assert_eq!(state, before);
    }

    #[test]
    fn water_intervention_and_decay_share_a_tick() {
        let mut engine = CrisisEngine::new();
        let mut state = SimulationState::new(250_000, 0.2).unwrap();
        state.apply_intervention(InterventionKind::Water);
        let mut rng = SequenceRandom::new(vec![0.99]);
        let report = engine.step(&mut state, &mut rng, 0.4).unwrap();
        assert_eq!(report.snapshot.water_access, 100.0);
        assert_eq!(report.snapshot.active_interventions[0].remaining_days, 9);
    }

    #[test]
    fn terminal_step_is_a_noop() {
        let mut engine = CrisisEngine::new();
        let mut state = SimulationState::new(1_000, 0.2).unwrap();
        state.day = 365;
        let before = state.snapshot();
        let mut rng = SequenceRandom::new(vec![0.0]);
        let report = engine.step(&mut state, &mut rng, 1.0).unwrap();
        assert!(!report.advanced);
        assert!(report.events.is_empty());
        assert_eq!(report.snapshot, before);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn terminal_step_ignores_conflict_probability() {
        let mut engine = CrisisEngine::new();
        let mut state = SimulationState::new(1_000, 0.2).unwrap();
        state.day = 365;
        let before = state.snapshot();
        let mut rng = SequenceRandom::new(vec![0.0]);
        let report = engine.step(&mut state, &mut rng, 1.5).unwrap();
        assert!(!report.advanced);
        assert_eq!(report.snapshot, before);
    }
}
