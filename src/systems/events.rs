use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    engine::{System, TickContext},
    event::SimEvent,
    rng::RandomSource,
    state::SimulationState,
};

/// Daily chance that one of the [`RandomEvent`]s happens.
pub const RANDOM_EVENT_CHANCE: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomEvent {
    RainfallRelief,
    SupplyConvoy,
    DiseaseOutbreak,
}

impl RandomEvent {
    pub const TABLE: [RandomEvent; 3] = [
        RandomEvent::RainfallRelief,
        RandomEvent::SupplyConvoy,
        RandomEvent::DiseaseOutbreak,
    ];

    /// Maps a uniform draw onto the table with equal weights.
    pub fn pick(draw: f64) -> Self {
        let index = (draw * Self::TABLE.len() as f64).floor() as usize;
        Self::TABLE[index.min(Self::TABLE.len() - 1)]
    }

    pub fn apply(self, state: &mut SimulationState) -> SimEvent {
        match self {
            RandomEvent::RainfallRelief => {
                state.adjust_water(10.0);
                SimEvent::RainfallRelief
            }
            RandomEvent::SupplyConvoy => {
                state.adjust_food(5.0);
                SimEvent::SupplyConvoy
            }
            RandomEvent::DiseaseOutbreak => {
                // floor(population * 0.002) without float rounding
                let affected = state.remove_population(state.population / 500);
                SimEvent::DiseaseOutbreak { affected }
            }
        }
    }
}

/// Rolls for a random environmental event. Consumes one draw, plus a
/// second one to pick the event when the first succeeds.
pub struct RandomEventSystem;

impl RandomEventSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomEventSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RandomEventSystem {
    fn name(&self) -> &'static str {
        "random_events"
    }

    fn run(
        &mut self,
        ctx: &TickContext,
        state: &mut SimulationState,
        rng: &mut dyn RandomSource,
        events: &mut Vec<SimEvent>,
    ) {
        if rng.next_unit() >= RANDOM_EVENT_CHANCE {
            return;
        }
        let event = RandomEvent::pick(rng.next_unit());
        debug!(day = ctx.day, ?event, "random event");
        events.push(event.apply(state));
    }
}
