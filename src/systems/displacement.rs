use tracing::debug;

use crate::{
    engine::{System, TickContext},
    event::SimEvent,
    rng::RandomSource,
    state::SimulationState,
};

/// Share of residents leaving today given current shortfalls.
///
/// Sustained low levels can empty the population well before the period
/// ends; the formula is kept as is.
pub fn displacement_factor(food_supply: f64, water_access: f64, security_level: f64) -> f64 {
    (100.0 - food_supply) * 0.0002
        + (100.0 - water_access) * 0.0003
        + (100.0 - security_level) * 0.0004
}

pub struct DisplacementSystem;

impl DisplacementSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DisplacementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DisplacementSystem {
    fn name(&self) -> &'static str {
        "displacement"
    }

    fn run(
        &mut self,
        ctx: &TickContext,
        state: &mut SimulationState,
        _rng: &mut dyn RandomSource,
        _events: &mut Vec<SimEvent>,
    ) {
        let factor = displacement_factor(
            state.food_supply,
            state.water_access,
            state.security_level,
        );
        let new_displaced = (state.population as f64 * factor).floor().max(0.0) as u64;
        let moved = state.displace(new_displaced);
        if moved > 0 {
            debug!(day = ctx.day, moved, factor, "population displaced");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRandom;

    #[test]
    fn no_shortfall_no_displacement() {
        assert_eq!(displacement_factor(100.0, 100.0, 100.0), 0.0);
    }

    #[test]
    fn moves_residents_and_conserves_total() {
        let mut state = SimulationState::new(100_000, 0.2).unwrap();
        state.food_supply = 50.0;
        state.water_access = 50.0;
        state.security_level = 50.0;
        // factor = 0.01 + 0.015 + 0.02 = 0.045
        let mut rng = SequenceRandom::new(Vec::new());
        let ctx = TickContext {
            day: 1,
            conflict_probability: 0.0,
        };
        DisplacementSystem::new().run(&ctx, &mut state, &mut rng, &mut Vec::new());
        let moved = state.displaced_population();
        assert!((4_499..=4_500).contains(&moved), "moved {moved}");
        assert_eq!(state.population() + moved, 100_000);
    }

    #[test]
    fn never_displaces_more_than_residents() {
        let mut state = SimulationState::new(10, 0.2).unwrap();
        state.food_supply = 0.0;
        state.water_access = 0.0;
        state.security_level = 0.0;
        state.population = 3;
        let mut rng = SequenceRandom::new(Vec::new());
        let ctx = TickContext {
            day: 1,
            conflict_probability: 0.0,
        };
        DisplacementSystem::new().run(&ctx, &mut state, &mut rng, &mut Vec::new());
        assert!(state.population() <= 3);
    }
}
