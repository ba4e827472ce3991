//! Wall-clock driver.
//!
//! One task owns the [`SimulationState`] and the generator, so access to the
//! state is serialized by construction. Everything else talks to it through
//! a command channel and watches frames on a broadcast channel.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::{
    components::InterventionKind,
    engine::CrisisEngine,
    error::check_unit_interval,
    event::SimEvent,
    history::{History, CHART_WINDOW_DAYS},
    rng::RandomSource,
    runner::deploy_due,
    scenario::ScheduledIntervention,
    snapshot::LoggedEvent,
    state::{SimulationSnapshot, SimulationState},
};

const FRAME_CHANNEL_CAPACITY: usize = 512;
const COMMAND_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub enum DriverCommand {
    Pause,
    Resume,
    Intervene(InterventionKind),
    SetDroughtIndex(f64),
    SetConflictProbability(f64),
    Reset {
        initial_population: u64,
        drought_index: f64,
    },
    Stop,
}

#[derive(Clone, Debug, Serialize)]
pub struct Frame {
    pub snapshot: SimulationSnapshot,
    pub log: Vec<LoggedEvent>,
    pub conflict_probability: f64,
    pub paused: bool,
    pub completed: bool,
    /// Trailing chart series ending at this frame's day.
    pub chart: History,
}

pub struct LiveSettings {
    pub cadence: Duration,
    pub conflict_probability: f64,
    pub schedule: Vec<ScheduledIntervention>,
    pub start_paused: bool,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("driver has stopped")]
    Closed,
    #[error("driver task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub struct LiveHandle {
    commands: mpsc::Sender<DriverCommand>,
    frames: broadcast::Sender<Frame>,
    latest: watch::Receiver<Option<Frame>>,
    task: JoinHandle<SimulationState>,
}

impl LiveHandle {
    pub async fn send(&self, command: DriverCommand) -> Result<(), DriverError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| DriverError::Closed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.frames.subscribe()
    }

    pub fn latest(&self) -> Option<Frame> {
        self.latest.borrow().clone()
    }

    /// Stops the driver and hands the state back.
    pub async fn stop(self) -> Result<SimulationState, DriverError> {
        let LiveHandle { commands, task, .. } = self;
        // the task may already be gone after a Stop sent earlier
        let _ = commands.send(DriverCommand::Stop).await;
        drop(commands);
        Ok(task.await?)
    }
}

pub struct LiveDriver {
    engine: CrisisEngine,
    state: SimulationState,
    rng: Box<dyn RandomSource + Send>,
    conflict_probability: f64,
    schedule: Vec<ScheduledIntervention>,
    paused: bool,
    history: History,
    frames: broadcast::Sender<Frame>,
    latest: watch::Sender<Option<Frame>>,
}

impl LiveDriver {
    /// Spawns the driver on the current runtime. The returned receiver is
    /// subscribed before the first frame can be sent.
    pub fn spawn(
        state: SimulationState,
        rng: impl RandomSource + Send + 'static,
        settings: LiveSettings,
    ) -> (LiveHandle, broadcast::Receiver<Frame>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (frame_tx, frame_rx) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        let (latest_tx, latest_rx) = watch::channel(None);

        let conflict_probability = if check_unit_interval(settings.conflict_probability) {
            settings.conflict_probability
        } else {
            warn!(
                value = settings.conflict_probability,
                "conflict probability out of range, clamping"
            );
            settings.conflict_probability.clamp(0.0, 1.0)
        };

        let driver = LiveDriver {
            engine: CrisisEngine::new(),
            state,
            rng: Box::new(rng),
            conflict_probability,
            schedule: settings.schedule,
            paused: settings.start_paused,
            history: History::new(),
            frames: frame_tx.clone(),
            latest: latest_tx,
        };
        let task = tokio::spawn(driver.run(settings.cadence, command_rx));

        let handle = LiveHandle {
            commands: command_tx,
            frames: frame_tx,
            latest: latest_rx,
            task,
        };
        (handle, frame_rx)
    }

    async fn run(
        mut self,
        cadence: Duration,
        mut commands: mpsc::Receiver<DriverCommand>,
    ) -> SimulationState {
        let cadence = cadence.max(Duration::from_millis(1));
        let mut ticker = time::interval(cadence);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval fires immediately; the first day should take one cadence
        ticker.tick().await;

        self.publish(Vec::new());
        info!(cadence_ms = cadence.as_millis() as u64, "live driver started");

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if command == DriverCommand::Stop {
                        break;
                    }
                    let resumed = self.paused && command == DriverCommand::Resume;
                    let log = self.handle(command);
                    if resumed {
                        ticker.reset();
                    }
                    self.publish(log);
                }
                _ = ticker.tick(), if self.is_ticking() => {
                    self.tick();
                }
            }
        }

        info!(day = self.state.day(), "live driver stopped");
        self.state
    }

    fn is_ticking(&self) -> bool {
        !self.paused && !self.state.is_terminal()
    }

    fn tick(&mut self) {
        let mut log = deploy_due(&mut self.state, &self.schedule);
        match self
            .engine
            .step(&mut self.state, self.rng.as_mut(), self.conflict_probability)
        {
            Ok(report) => {
                let day = report.snapshot.day;
                log.extend(
                    report
                        .events
                        .into_iter()
                        .map(|event| LoggedEvent::new(day, event)),
                );
            }
            Err(err) => warn!(error = %err, "tick rejected"),
        }
        self.publish(log);
    }

    fn handle(&mut self, command: DriverCommand) -> Vec<LoggedEvent> {
        match command {
            DriverCommand::Pause => {
                self.paused = true;
                info!(day = self.state.day(), "simulation paused");
            }
            DriverCommand::Resume => {
                self.paused = false;
                info!(day = self.state.day(), "simulation resumed");
            }
            DriverCommand::Intervene(kind) => {
                if !self.is_ticking() {
                    warn!(%kind, "intervention ignored while the simulation is not running");
                    return Vec::new();
                }
                let intervention = self.state.apply_intervention(kind);
                return vec![LoggedEvent::new(
                    self.state.day(),
                    SimEvent::InterventionDeployed {
                        kind,
                        name: intervention.name,
                        duration_days: intervention.remaining_days,
                    },
                )];
            }
            DriverCommand::SetDroughtIndex(value) => {
                if let Err(err) = self.state.set_drought_index(value) {
                    warn!(error = %err, "drought index rejected");
                }
            }
            DriverCommand::SetConflictProbability(value) => {
                if check_unit_interval(value) {
                    self.conflict_probability = value;
                } else {
                    warn!(value, "conflict probability rejected");
                }
            }
            DriverCommand::Reset {
                initial_population,
                drought_index,
            } => match self.state.reset(initial_population, drought_index) {
                Ok(()) => self.paused = true,
                Err(err) => warn!(error = %err, "reset rejected"),
            },
            DriverCommand::Stop => {}
        }
        Vec::new()
    }

    fn publish(&mut self, log: Vec<LoggedEvent>) {
        let snapshot = self.state.snapshot();
        self.history.record(&snapshot);
        let frame = Frame {
            snapshot,
            log,
            conflict_probability: self.conflict_probability,
            paused: self.paused,
            completed: self.state.is_terminal(),
            chart: self.history.window(CHART_WINDOW_DAYS).to_history(),
        };
        self.latest.send_replace(Some(frame.clone()));
        // no subscribers is fine
        let _ = self.frames.send(frame);
    }
}
