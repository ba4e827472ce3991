use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crisis_sim::{
    live::{Frame, LiveDriver, LiveSettings},
    rng::seeded,
    runner::{RunSettings, Runner},
    scenario::ScenarioLoader,
    telemetry::init_logging,
    state::SimulationSnapshot,
    view::{log_line, metrics_panel, population_dots},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Environmental crisis simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/baseline.yaml")]
    scenario: PathBuf,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the per-tick conflict probability
    #[arg(long)]
    conflict_probability: Option<f64>,

    /// Stop after this many ticks (headless runs only)
    #[arg(long, conflicts_with = "live")]
    ticks: Option<u32>,

    /// Override snapshot interval in days (0 disables periodic snapshots)
    #[arg(long)]
    snapshot_interval: Option<u32>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Step on a wall-clock cadence instead of as fast as possible
    #[arg(long)]
    live: bool,

    /// Override the live cadence in milliseconds
    #[arg(long)]
    cadence_ms: Option<u64>,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(level) = cli.log_level.clone() {
        scenario.logging.level = level;
    }
    init_logging(&scenario.logging);

    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if let Some(probability) = cli.conflict_probability {
        scenario.conflict_probability = probability;
    }
    if let Some(interval) = cli.snapshot_interval {
        scenario.snapshot_interval_ticks = interval;
    }
    if let Some(cadence_ms) = cli.cadence_ms {
        scenario.cadence_ms = cadence_ms;
    }
    scenario.validate()?;

    let state = scenario
        .build_state()
        .context("scenario produced an invalid initial state")?;

    if cli.live {
        return run_live(&scenario, state).await;
    }

    let snapshot_dir = cli
        .snapshot_dir
        .unwrap_or_else(|| PathBuf::from("snapshots"));
    let mut settings = RunSettings::from_scenario(&scenario, snapshot_dir);
    settings.max_ticks = cli.ticks;

    let mut state = state;
    let summary = Runner::new(settings).run(&mut state)?;
    for logged in &summary.events {
        println!("{}", log_line(logged.day, &logged.event));
    }
    let panel = metrics_panel(&summary.final_snapshot);
    println!(
        "Scenario '{}' stopped on day {}. Population: {}, displaced: {}, food {}, water {}, security {}",
        scenario.name,
        panel.day,
        panel.population,
        panel.displaced,
        panel.food,
        panel.water,
        panel.security
    );
    print_programmes(&summary.final_snapshot);
    if let Some(path) = summary.summary_path {
        println!("Summary written to {}", path.display());
    }
    Ok(())
}

async fn run_live(
    scenario: &crisis_sim::Scenario,
    state: crisis_sim::SimulationState,
) -> Result<()> {
    let settings = LiveSettings {
        cadence: scenario.cadence(),
        conflict_probability: scenario.conflict_probability,
        schedule: scenario.interventions.clone(),
        start_paused: false,
    };
    let (handle, mut frames) = LiveDriver::spawn(state, seeded(scenario.seed), settings);

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(frame) => {
                    print_frame(&frame);
                    if frame.completed {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "frame receiver lagged"),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("Stopping simulation...");
                break;
            }
        }
    }

    let state = handle.stop().await?;
    println!(
        "Scenario '{}' stopped on day {}.",
        scenario.name,
        state.day()
    );
    Ok(())
}

fn print_frame(frame: &Frame) {
    for logged in &frame.log {
        println!("{}", log_line(logged.day, &logged.event));
    }
    let panel = metrics_panel(&frame.snapshot);
    let dots = population_dots(&frame.snapshot);
    println!(
        "day {:>3} | population {:>10} | displaced {:>10} | food {:>4} | water {:>4} | security {:>4} | dots {}/{}",
        panel.day,
        panel.population,
        panel.displaced,
        panel.food,
        panel.water,
        panel.security,
        dots.resident,
        dots.displaced
    );
    if !frame.log.is_empty() || frame.completed {
        print_programmes(&frame.snapshot);
    }
}

fn print_programmes(snapshot: &SimulationSnapshot) {
    for intervention in &snapshot.active_interventions {
        println!(
            "  {} ({} days left): {}",
            intervention.name,
            intervention.remaining_days,
            intervention.effectiveness()
        );
    }
}
