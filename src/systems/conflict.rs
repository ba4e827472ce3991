use tracing::debug;

use crate::{
    engine::{System, TickContext},
    event::SimEvent,
    rng::RandomSource,
    state::SimulationState,
};

const SECURITY_LOSS: f64 = 15.0;

/// Chance of an outbreak this tick. Zero while security is full.
pub fn conflict_threshold(conflict_probability: f64, security_level: f64) -> f64 {
    conflict_probability * (1.0 - security_level / 100.0) * 0.1
}

pub struct ConflictSystem;

impl ConflictSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConflictSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ConflictSystem {
    fn name(&self) -> &'static str {
        "conflict"
    }

    fn run(
        &mut self,
        ctx: &TickContext,
        state: &mut SimulationState,
        rng: &mut dyn RandomSource,
        events: &mut Vec<SimEvent>,
    ) {
        let draw = rng.next_unit();
        if draw < conflict_threshold(ctx.conflict_probability, state.security_level) {
            state.adjust_security(-SECURITY_LOSS);
            debug!(day = ctx.day, security = state.security_level, "conflict outbreak");
            events.push(SimEvent::ConflictOutbreak);
        }
    }
}
