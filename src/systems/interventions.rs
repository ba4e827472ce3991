use tracing::info;

use crate::{
    components::InterventionKind,
    engine::{System, TickContext},
    event::SimEvent,
    rng::RandomSource,
    state::SimulationState,
};

/// One day's worth of a programme's effect.
pub fn apply_effect(kind: InterventionKind, state: &mut SimulationState) {
    match kind {
        InterventionKind::Food => state.adjust_food(1.0),
        InterventionKind::Water => state.adjust_water(1.5),
        InterventionKind::Security => state.adjust_security(0.8),
        InterventionKind::Medical => {
            // floor(displaced * 0.01)
            let returnees = state.displaced_population / 100;
            state.return_displaced(returnees);
        }
        InterventionKind::Shelter => {
            state.adjust_food(0.2);
            state.adjust_water(0.2);
            state.adjust_security(0.1);
        }
    }
}

/// Counts down every active programme, applies it, and drops the ones
/// that ran out. The expiring day still gets its effect.
pub struct InterventionSystem;

impl InterventionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InterventionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for InterventionSystem {
    fn name(&self) -> &'static str {
        "interventions"
    }

    fn run(
        &mut self,
        ctx: &TickContext,
        state: &mut SimulationState,
        _rng: &mut dyn RandomSource,
        events: &mut Vec<SimEvent>,
    ) {
        let mut interventions = std::mem::take(&mut state.active_interventions);
        for intervention in interventions.iter_mut() {
            if intervention.remaining_days == 0 {
                continue;
            }
            intervention.remaining_days -= 1;
            apply_effect(intervention.kind, state);
            if intervention.remaining_days == 0 {
                info!(day = ctx.day, kind = %intervention.kind, "intervention ended");
                events.push(SimEvent::InterventionEnded {
                    kind: intervention.kind,
                    name: intervention.name.clone(),
                });
            }
        }
        interventions.retain(|intervention| intervention.is_active());
        state.active_interventions = interventions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRandom;

    fn run_once(state: &mut SimulationState) -> Vec<SimEvent> {
        let mut rng = SequenceRandom::new(Vec::new());
        let mut events = Vec::new();
        let ctx = TickContext {
            day: state.day,
            conflict_probability: 0.0,
        };
        InterventionSystem::new().run(&ctx, state, &mut rng, &mut events);
        events
    }

    #[test]
    fn last_day_applies_then_expires() {
        let mut state = SimulationState::new(1_000, 0.2).unwrap();
        state.food_supply = 50.0;
        state.apply_intervention(InterventionKind::Food);
        state.active_interventions[0].remaining_days = 1;
        let events = run_once(&mut state);
        assert_eq!(state.food_supply(), 51.0);
        assert!(state.active_interventions().is_empty());
        assert_eq!(
            events,
            vec![SimEvent::InterventionEnded {
                kind: InterventionKind::Food,
                name: "Food Distribution".into(),
            }]
        );
    }

    #[test]
    fn duplicates_stack() {
        let mut state = SimulationState::new(1_000, 0.2).unwrap();
        state.security_level = 10.0;
        state.apply_intervention(InterventionKind::Security);
        state.apply_intervention(InterventionKind::Security);
        run_once(&mut state);
        assert!((state.security_level() - 11.6).abs() < 1e-9);
        assert!(state
            .active_interventions()
            .iter()
            .all(|i| i.remaining_days == 29));
    }

    #[test]
    fn medical_returns_one_percent() {
        let mut state = SimulationState::new(10_000, 0.2).unwrap();
        state.displace(5_050);
        state.apply_intervention(InterventionKind::Medical);
        run_once(&mut state);
        assert_eq!(state.displaced_population(), 5_000);
        assert_eq!(state.population(), 5_000);
    }

    #[test]
    fn shelter_nudges_every_level() {
        let mut state = SimulationState::new(1_000, 0.2).unwrap();
        state.food_supply = 10.0;
        state.water_access = 20.0;
        state.security_level = 30.0;
        state.apply_intervention(InterventionKind::Shelter);
        run_once(&mut state);
        assert!((state.food_supply() - 10.2).abs() < 1e-9);
        assert!((state.water_access() - 20.2).abs() < 1e-9);
        assert!((state.security_level() - 30.1).abs() < 1e-9);
    }

    #[test]
    fn order_is_preserved() {
        let mut state = SimulationState::new(1_000, 0.2).unwrap();
        state.apply_intervention(InterventionKind::Water);
        state.apply_intervention(InterventionKind::Food);
        state.apply_intervention(InterventionKind::Shelter);
        state.active_interventions[1].remaining_days = 1;
        run_once(&mut state);
        let kinds: Vec<_> = state.active_interventions().iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![InterventionKind::Water, InterventionKind::Shelter]);
    }
}
