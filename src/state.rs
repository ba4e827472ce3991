use serde::{Deserialize, Serialize};
use tracing::info;

use crate::components::{Environment, Intervention, InterventionKind};
use crate::error::{check_unit_interval, SimError};

/// Length of a simulated period in days.
pub const SIMULATION_DAYS: u32 = 365;
/// Upper bound of the food, water, and security percentages.
pub const MAX_LEVEL: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    Running,
    Terminal,
}

/// Mutable aggregate advanced by [`crate::engine::CrisisEngine::step`].
///
/// Callers outside the crate go through accessors and the clamped
/// mutators, so the percentage levels stay inside `[0, 100]` and head
/// counts never go negative. The phase systems write the `pub(crate)`
/// fields directly and use the same helpers for the bounded ones.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationState {
    pub(crate) day: u32,
    pub(crate) initial_population: u64,
    pub(crate) population: u64,
    pub(crate) displaced_population: u64,
    pub(crate) food_supply: f64,
    pub(crate) water_access: f64,
    pub(crate) security_level: f64,
    pub(crate) environment: Environment,
    pub(crate) active_interventions: Vec<Intervention>,
}

impl SimulationState {
    pub fn new(initial_population: u64, drought_index: f64) -> Result<Self, SimError> {
        Self::with_environment(initial_population, Environment::with_drought(drought_index))
    }

    pub fn with_environment(
        initial_population: u64,
        environment: Environment,
    ) -> Result<Self, SimError> {
        validate_initial(initial_population, environment.drought_index)?;
        Ok(Self {
            day: 0,
            initial_population,
            population: initial_population,
            displaced_population: 0,
            food_supply: MAX_LEVEL,
            water_access: MAX_LEVEL,
            security_level: MAX_LEVEL,
            environment,
            active_interventions: Vec::new(),
        })
    }

    /// Reinitializes every field. On invalid input the state is left as it was.
    pub fn reset(&mut self, initial_population: u64, drought_index: f64) -> Result<(), SimError> {
        *self = Self::new(initial_population, drought_index)?;
        info!(
            initial_population,
            drought_index, "simulation state reset"
        );
        Ok(())
    }

    /// Registers a new programme. Duplicates of the same kind stack.
    pub fn apply_intervention(&mut self, kind: InterventionKind) -> Intervention {
        let intervention = Intervention::new(kind);
        info!(
            day = self.day,
            kind = %kind,
            remaining_days = intervention.remaining_days,
            "intervention deployed"
        );
        self.active_interventions.push(intervention.clone());
        intervention
    }

    pub fn set_drought_index(&mut self, drought_index: f64) -> Result<(), SimError> {
        if !check_unit_interval(drought_index) {
            return Err(SimError::InvalidDroughtIndex(drought_index));
        }
        self.environment.drought_index = drought_index;
        Ok(())
    }

    pub fn status(&self) -> SimulationStatus {
        if self.population == 0 || self.day >= SIMULATION_DAYS {
            SimulationStatus::Terminal
        } else {
            SimulationStatus::Running
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status() == SimulationStatus::Terminal
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            day: self.day,
            initial_population: self.initial_population,
            population: self.population,
            displaced_population: self.displaced_population,
            food_supply: self.food_supply,
            water_access: self.water_access,
            security_level: self.security_level,
            environment: self.environment.clone(),
            active_interventions: self.active_interventions.clone(),
            status: self.status(),
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn initial_population(&self) -> u64 {
        self.initial_population
    }

    pub fn population(&self) -> u64 {
        self.population
    }

    pub fn displaced_population(&self) -> u64 {
        self.displaced_population
    }

    pub fn food_supply(&self) -> f64 {
        self.food_supply
    }

    pub fn water_access(&self) -> f64 {
        self.water_access
    }

    pub fn security_level(&self) -> f64 {
        self.security_level
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn active_interventions(&self) -> &[Intervention] {
        &self.active_interventions
    }

    pub(crate) fn adjust_food(&mut self, delta: f64) {
        self.food_supply = clamp_level(self.food_supply + delta);
    }

    pub(crate) fn adjust_water(&mut self, delta: f64) {
        self.water_access = clamp_level(self.water_access + delta);
    }

    pub(crate) fn adjust_security(&mut self, delta: f64) {
        self.security_level = clamp_level(self.security_level + delta);
    }

    /// Moves up to `count` people from residents to displaced.
    pub(crate) fn displace(&mut self, count: u64) -> u64 {
        let moved = count.min(self.population);
        self.population -= moved;
        self.displaced_population += moved;
        moved
    }

    /// Moves up to `count` displaced people back to residents.
    pub(crate) fn return_displaced(&mut self, count: u64) -> u64 {
        let moved = count.min(self.displaced_population);
        self.displaced_population -= moved;
        self.population += moved;
        moved
    }

    /// Removes residents from the total without displacing them.
    pub(crate) fn remove_population(&mut self, count: u64) -> u64 {
        let removed = count.min(self.population);
        self.population -= removed;
        removed
    }
}

/// Read-only copy of the state after a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub day: u32,
    pub initial_population: u64,
    pub population: u64,
    pub displaced_population: u64,
    pub food_supply: f64,
    pub water_access: f64,
    pub security_level: f64,
    pub environment: Environment,
    pub active_interventions: Vec<Intervention>,
    pub status: SimulationStatus,
}

fn clamp_level(value: f64) -> f64 {
    value.clamp(0.0, MAX_LEVEL)
}

fn validate_initial(initial_population: u64, drought_index: f64) -> Result<(), SimError> {
    if initial_population == 0 {
        return Err(SimError::InvalidPopulation);
    }
    if !check_unit_interval(drought_index) {
        return Err(SimError::InvalidDroughtIndex(drought_index));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_uses_defaults() {
        let state = SimulationState::new(250_000, 0.2).unwrap();
        assert_eq!(state.day(), 0);
        assert_eq!(state.population(), 250_000);
        assert_eq!(state.displaced_population(), 0);
        assert_eq!(state.food_supply(), 100.0);
        assert_eq!(state.water_access(), 100.0);
        assert_eq!(state.security_level(), 100.0);
        assert_eq!(state.environment().rainfall_mm, 50.0);
        assert_eq!(state.environment().temperature_c, 28.0);
        assert!(state.active_interventions().is_empty());
        assert_eq!(state.status(), SimulationStatus::Running);
    }

    #[test]
    fn rejects_invalid_initial_conditions() {
        assert_eq!(
            SimulationState::new(0, 0.2).unwrap_err(),
            SimError::InvalidPopulation
        );
        assert!(matches!(
            SimulationState::new(10, 1.5),
            Err(SimError::InvalidDroughtIndex(_))
        ));
        assert!(SimulationState::new(10, f64::NAN).is_err());
    }

    #[test]
    fn failed_reset_leaves_state_untouched() {
        let mut state = SimulationState::new(1_000, 0.3).unwrap();
        state.apply_intervention(InterventionKind::Food);
        let before = state.clone();
        assert!(state.reset(0, 0.3).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut state = SimulationState::new(1_000, 0.3).unwrap();
        state.day = 40;
        state.displace(100);
        state.apply_intervention(InterventionKind::Shelter);
        state.reset(5_000, 0.7).unwrap();
        let once = state.clone();
        state.reset(5_000, 0.7).unwrap();
        assert_eq!(state, once);
        assert_eq!(state.population(), 5_000);
        assert_eq!(state.environment().drought_index, 0.7);
    }

    #[test]
    fn interventions_stack() {
        let mut state = SimulationState::new(1_000, 0.3).unwrap();
        state.apply_intervention(InterventionKind::Water);
        state.apply_intervention(InterventionKind::Water);
        assert_eq!(state.active_interventions().len(), 2);
    }

    #[test]
    fn levels_saturate() {
        let mut state = SimulationState::new(1_000, 0.3).unwrap();
        state.adjust_food(25.0);
        state.adjust_water(-250.0);
        assert_eq!(state.food_supply(), 100.0);
        assert_eq!(state.water_access(), 0.0);
    }

    #[test]
    fn head_count_moves_are_capped() {
        let mut state = SimulationState::new(100, 0.3).unwrap();
        assert_eq!(state.displace(150), 100);
        assert_eq!(state.population(), 0);
        assert_eq!(state.return_displaced(10), 10);
        assert_eq!(state.remove_population(50), 10);
        assert_eq!(state.displaced_population(), 90);
    }

    #[test]
    fn terminal_conditions() {
        let mut state = SimulationState::new(100, 0.3).unwrap();
        state.day = SIMULATION_DAYS;
        assert!(state.is_terminal());
        state.day = 3;
        state.displace(100);
        assert!(state.is_terminal());
    }
}
