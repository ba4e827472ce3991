pub mod components;
pub mod engine;
pub mod error;
pub mod event;
pub mod history;
pub mod live;
pub mod rng;
pub mod runner;
pub mod scenario;
pub mod snapshot;
pub mod state;
pub mod systems;
pub mod telemetry;
pub mod view;

pub use components::{Environment, Intervention, InterventionKind};
pub use engine::{CrisisEngine, TickReport};
pub use error::SimError;
pub use event::SimEvent;
pub use rng::{RandomSource, SequenceRandom};
pub use scenario::{Scenario, ScenarioLoader};
pub use state::{SimulationSnapshot, SimulationState, SimulationStatus, SIMULATION_DAYS};
