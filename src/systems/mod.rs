mod conflict;
mod displacement;
mod environment;
mod events;
mod interventions;

pub use conflict::{conflict_threshold, ConflictSystem};
pub use displacement::{displacement_factor, DisplacementSystem};
pub use environment::{DroughtSystem, RecoverySystem};
pub use events::{RandomEvent, RandomEventSystem, RANDOM_EVENT_CHANCE};
pub use interventions::{apply_effect, InterventionSystem};
