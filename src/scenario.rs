use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    components::{Environment, InterventionKind, DEFAULT_RAINFALL_MM, DEFAULT_TEMPERATURE_C},
    error::{check_unit_interval, SimError},
    state::{SimulationState, SIMULATION_DAYS},
    telemetry::LoggingConfig,
};

fn default_initial_population() -> u64 {
    250_000
}

fn default_drought_index() -> f64 {
    0.2
}

fn default_conflict_probability() -> f64 {
    0.4
}

fn default_rainfall_mm() -> f64 {
    DEFAULT_RAINFALL_MM
}

fn default_temperature_c() -> f64 {
    DEFAULT_TEMPERATURE_C
}

fn default_cadence_ms() -> u64 {
    1_000
}

fn default_snapshot_interval_ticks() -> u32 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_initial_population")]
    pub initial_population: u64,
    #[serde(default = "default_drought_index")]
    pub drought_index: f64,
    #[serde(default = "default_conflict_probability")]
    pub conflict_probability: f64,
    #[serde(default = "default_rainfall_mm")]
    pub rainfall_mm: f64,
    #[serde(default = "default_temperature_c")]
    pub temperature_c: f64,
    /// Wall-clock time between ticks in live mode.
    #[serde(default = "default_cadence_ms")]
    pub cadence_ms: u64,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u32,
    #[serde(default)]
    pub interventions: Vec<ScheduledIntervention>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Programme deployed right before the tick that starts on `day`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledIntervention {
    pub day: u32,
    pub kind: InterventionKind,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario = Scenario::from_yaml(&data)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(text).context("invalid scenario YAML")?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("scenario must define a name");
        }
        if self.initial_population == 0 {
            return Err(SimError::InvalidPopulation.into());
        }
        if !check_unit_interval(self.drought_index) {
            return Err(SimError::InvalidDroughtIndex(self.drought_index).into());
        }
        if !check_unit_interval(self.conflict_probability) {
            return Err(SimError::InvalidConflictProbability(self.conflict_probability).into());
        }
        if let Some(late) = self
            .interventions
            .iter()
            .find(|scheduled| scheduled.day >= SIMULATION_DAYS)
        {
            bail!(
                "intervention '{}' scheduled on day {} never runs (period is {} days)",
                late.kind,
                late.day,
                SIMULATION_DAYS
            );
        }
        Ok(())
    }

    pub fn environment(&self) -> Environment {
        Environment::new(self.rainfall_mm, self.temperature_c, self.drought_index)
    }

    pub fn build_state(&self) -> Result<SimulationState, SimError> {
        SimulationState::with_environment(self.initial_population, self.environment())
    }

    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_takes_defaults() {
        let scenario = Scenario::from_yaml("name: quiet\nseed: 3\n").unwrap();
        assert_eq!(scenario.initial_population, 250_000);
        assert_eq!(scenario.drought_index, 0.2);
        assert_eq!(scenario.conflict_probability, 0.4);
        assert_eq!(scenario.cadence(), Duration::from_secs(1));
        assert_eq!(scenario.snapshot_interval_ticks, 30);
        assert_eq!(scenario.logging.level, "info");
        assert!(scenario.interventions.is_empty());
    }

    #[test]
    fn parses_scheduled_interventions() {
        let yaml = r#"
name: relief
seed: 11
interventions:
  - day: 0
    kind: water
  - day: 12
    kind: medical
"#;
        let scenario = Scenario::from_yaml(yaml).unwrap();
        let kinds: Vec<_> = scenario
            .interventions
            .iter()
            .map(|scheduled| (scheduled.day, scheduled.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![(0, InterventionKind::Water), (12, InterventionKind::Medical)]
        );
    }

    #[test]
    fn rejects_unknown_intervention_kind() {
        let yaml = "name: x\nseed: 1\ninterventions:\n  - day: 1\n    kind: airlift\n";
        assert!(Scenario::from_yaml(yaml).is_err());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Scenario::from_yaml("name: x\nseed: 1\ndrought_index: 2.0\n").is_err());
        assert!(Scenario::from_yaml("name: x\nseed: 1\ninitial_population: 0\n").is_err());
        assert!(Scenario::from_yaml("name: x\nseed: 1\nconflict_probability: -0.1\n").is_err());
        assert!(Scenario::from_yaml("name: ' '\nseed: 1\n").is_err());
    }

    #[test]
    fn builds_state_with_configured_environment() {
        let scenario =
            Scenario::from_yaml("name: x\nseed: 1\nrainfall_mm: 12.5\ndrought_index: 0.8\n")
                .unwrap();
        let state = scenario.build_state().unwrap();
        assert_eq!(state.environment().rainfall_mm, 12.5);
        assert_eq!(state.environment().drought_index, 0.8);
    }
}
