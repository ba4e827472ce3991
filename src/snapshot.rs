use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::TickReport;
use crate::event::SimEvent;
use crate::state::SimulationSnapshot;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Event tagged with the day it happened on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub day: u32,
    pub event: SimEvent,
    pub message: String,
}

impl LoggedEvent {
    pub fn new(day: u32, event: SimEvent) -> Self {
        let message = event.to_string();
        Self {
            day,
            event,
            message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunSummaryFile {
    pub scenario: String,
    pub seed: u64,
    pub generated_at: DateTime<Utc>,
    pub final_snapshot: SimulationSnapshot,
    pub events: Vec<LoggedEvent>,
}

/// Writes `tick_NNNNNN.json` files every `interval` days under
/// `<dir>/<scenario>/`. An interval of 0 turns periodic files off.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval: u32,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval: u32) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.interval > 0
    }

    pub fn scenario_dir(&self, scenario: &str) -> PathBuf {
        self.dir.join(scenario)
    }

    pub fn maybe_write(
        &self,
        report: &TickReport,
        scenario: &str,
    ) -> Result<Option<PathBuf>, SnapshotError> {
        if !self.is_enabled() || !report.advanced {
            return Ok(None);
        }
        let day = report.snapshot.day;
        if day % self.interval != 0 {
            return Ok(None);
        }
        let dir = self.scenario_dir(scenario);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("tick_{day:06}.json"));
        fs::write(&path, serde_json::to_string_pretty(report)?)?;
        Ok(Some(path))
    }

    pub fn write_summary(&self, summary: &RunSummaryFile) -> Result<PathBuf, SnapshotError> {
        let dir = self.scenario_dir(&summary.scenario);
        fs::create_dir_all(&dir)?;
        let path = dir.join("summary.json");
        fs::write(&path, serde_json::to_string_pretty(summary)?)?;
        Ok(path)
    }
}
