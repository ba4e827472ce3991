use crate::{
    engine::{System, TickContext},
    event::SimEvent,
    rng::RandomSource,
    state::SimulationState,
};

/// Drains water and food according to the drought index.
pub struct DroughtSystem;

impl DroughtSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DroughtSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DroughtSystem {
    fn name(&self) -> &'static str {
        "drought"
    }

    fn run(
        &mut self,
        _ctx: &TickContext,
        state: &mut SimulationState,
        _rng: &mut dyn RandomSource,
        _events: &mut Vec<SimEvent>,
    ) {
        let impact = state.environment.drought_impact();
        state.adjust_water(-impact * 2.0);
        state.adjust_food(-impact);
    }
}

const FOOD_RECOVERY: f64 = 0.1;
const WATER_RECOVERY: f64 = 0.05;
const SECURITY_RECOVERY: f64 = 0.02;

/// Slow natural recovery of every level.
pub struct RecoverySystem;

impl RecoverySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RecoverySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RecoverySystem {
    fn name(&self) -> &'static str {
        "recovery"
    }

    fn run(
        &mut self,
        _ctx: &TickContext,
        state: &mut SimulationState,
        _rng: &mut dyn RandomSource,
        _events: &mut Vec<SimEvent>,
    ) {
        state.adjust_food(FOOD_RECOVERY);
        state.adjust_water(WATER_RECOVERY);
        state.adjust_security(SECURITY_RECOVERY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRandom;

    fn ctx() -> TickContext {
        TickContext {
            day: 1,
            conflict_probability: 0.0,
        }
    }

    #[test]
    fn drought_hits_water_twice_as_hard() {
        let mut state = SimulationState::new(1_000, 0.4).unwrap();
        let mut rng = SequenceRandom::new(Vec::new());
        let mut events = Vec::new();
        DroughtSystem::new().run(&ctx(), &mut state, &mut rng, &mut events);
        assert!((state.water_access() - 99.6).abs() < 1e-9);
        assert!((state.food_supply() - 99.8).abs() < 1e-9);
        assert_eq!(rng.draws(), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn drought_never_goes_below_zero() {
        let mut state = SimulationState::new(1_000, 1.0).unwrap();
        state.food_supply = 0.2;
        state.water_access = 0.5;
        let mut rng = SequenceRandom::new(Vec::new());
        DroughtSystem::new().run(&ctx(), &mut state, &mut rng, &mut Vec::new());
        assert_eq!(state.food_supply(), 0.0);
        assert_eq!(state.water_access(), 0.0);
    }

    #[test]
    fn recovery_saturates_at_full() {
        let mut state = SimulationState::new(1_000, 0.0).unwrap();
        state.security_level = 50.0;
        let mut rng = SequenceRandom::new(Vec::new());
        RecoverySystem::new().run(&ctx(), &mut state, &mut rng, &mut Vec::new());
        assert_eq!(state.food_supply(), 100.0);
        assert_eq!(state.water_access(), 100.0);
        assert!((state.security_level() - 50.02).abs() < 1e-9);
    }
}
