use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::{
    engine::{CrisisEngine, TickReport},
    event::SimEvent,
    rng::{seeded, RandomSource},
    scenario::{Scenario, ScheduledIntervention},
    snapshot::{LoggedEvent, RunSummaryFile, SnapshotWriter},
    state::{SimulationSnapshot, SimulationState},
};

pub struct RunSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub conflict_probability: f64,
    pub snapshot_interval_ticks: u32,
    pub snapshot_dir: PathBuf,
    /// Stop after this many ticks even if the state is still running.
    pub max_ticks: Option<u32>,
    pub schedule: Vec<ScheduledIntervention>,
    pub write_summary: bool,
}

impl RunSettings {
    pub fn from_scenario(scenario: &Scenario, snapshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            scenario_name: scenario.name.clone(),
            seed: scenario.seed,
            conflict_probability: scenario.conflict_probability,
            snapshot_interval_ticks: scenario.snapshot_interval_ticks,
            snapshot_dir: snapshot_dir.into(),
            max_ticks: None,
            schedule: scenario.interventions.clone(),
            write_summary: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ticks: u32,
    pub final_snapshot: SimulationSnapshot,
    pub events: Vec<LoggedEvent>,
    pub snapshots_written: Vec<PathBuf>,
    pub summary_path: Option<PathBuf>,
}

/// Deploys every scheduled programme due at the state's current day and
/// returns the matching log entries.
pub fn deploy_due(
    state: &mut SimulationState,
    schedule: &[ScheduledIntervention],
) -> Vec<LoggedEvent> {
    let day = state.day();
    schedule
        .iter()
        .filter(|scheduled| scheduled.day == day)
        .map(|scheduled| {
            let intervention = state.apply_intervention(scheduled.kind);
            LoggedEvent::new(
                day,
                SimEvent::InterventionDeployed {
                    kind: intervention.kind,
                    name: intervention.name,
                    duration_days: intervention.remaining_days,
                },
            )
        })
        .collect()
}

/// Headless driver: steps a caller-held state back to back until it is
/// terminal.
pub struct Runner {
    settings: RunSettings,
    engine: CrisisEngine,
    rng: Box<dyn RandomSource + Send>,
    writer: SnapshotWriter,
}

impl Runner {
    pub fn new(settings: RunSettings) -> Self {
        let rng = seeded(settings.seed);
        Self::with_rng(settings, rng)
    }

    pub fn with_rng(settings: RunSettings, rng: impl RandomSource + Send + 'static) -> Self {
        Self {
            writer: SnapshotWriter::new(&settings.snapshot_dir, settings.snapshot_interval_ticks),
            engine: CrisisEngine::new(),
            rng: Box::new(rng),
            settings,
        }
    }

    pub fn run(&mut self, state: &mut SimulationState) -> Result<RunSummary> {
        self.run_with_hook(state, |_| {})
    }

    pub fn run_with_hook<F>(
        &mut self,
        state: &mut SimulationState,
        mut hook: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(&TickReport),
    {
        let mut events = Vec::new();
        let mut snapshots_written = Vec::new();
        let mut ticks = 0_u32;

        while !state.is_terminal() {
            if self.settings.max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }
            events.extend(deploy_due(state, &self.settings.schedule));
            let report = self.engine.step(
                state,
                self.rng.as_mut(),
                self.settings.conflict_probability,
            )?;
            ticks += 1;
            let day = report.snapshot.day;
            events.extend(
                report
                    .events
                    .iter()
                    .cloned()
                    .map(|event| LoggedEvent::new(day, event)),
            );
            if let Some(path) = self
                .writer
                .maybe_write(&report, &self.settings.scenario_name)?
            {
                snapshots_written.push(path);
            }
            hook(&report);
        }

        let final_snapshot = state.snapshot();
        let summary_path = if self.settings.write_summary {
            let file = RunSummaryFile {
                scenario: self.settings.scenario_name.clone(),
                seed: self.settings.seed,
                generated_at: chrono::Utc::now(),
                final_snapshot: final_snapshot.clone(),
                events: events.clone(),
            };
            Some(self.writer.write_summary(&file)?)
        } else {
            None
        };

        info!(
            scenario = %self.settings.scenario_name,
            ticks,
            day = final_snapshot.day,
            population = final_snapshot.population,
            displaced = final_snapshot.displaced_population,
            "run finished"
        );

        Ok(RunSummary {
            ticks,
            final_snapshot,
            events,
            snapshots_written,
            summary_path,
        })
    }
}
