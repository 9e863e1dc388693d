use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use macroquad::prelude::{get_frame_time, is_key_down, is_key_pressed, next_frame, Conf, KeyCode};
use tracing::{error, info, warn};

mod agent;
mod brain;
mod config;
mod controller;
mod error;
mod physics;
mod renderer;
mod reporting;
mod reward;
mod sensory;
mod simulation;
mod stats;
mod track;
mod ui;

use config::SimConfig;
use controller::InputState;
use error::SimError;
use simulation::SimState;
use stats::SimStats;
use ui::UiState;

#[derive(Parser, Debug)]
#[command(name = "circuit", about = "Sensor-driven agents racing gates around a square track")]
struct Args {
    /// JSON config file; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured master seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides the configured number of policy agents.
    #[arg(long)]
    population: Option<usize>,

    /// Add a keyboard-driven agent (arrow keys).
    #[arg(long)]
    human: bool,

    /// Evaluate epochs without opening a window.
    #[arg(long)]
    headless: bool,

    /// Epochs to run in headless mode.
    #[arg(long, default_value_t = 1)]
    epochs: u32,

    /// Write epoch reports as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn window_conf() -> Conf {
    Conf {
        window_title: "CIRCUIT".to_string(),
        window_width: 800,
        window_height: 800,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(population) = args.population {
        config.population = population;
    }
    Ok(config)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(&args)?;

    if args.headless {
        if args.human {
            warn!("--human has no effect in headless mode");
        }
        return run_headless(config, args.epochs, args.report.as_deref());
    }

    let sim = SimState::new(config, args.human).context("building simulation")?;
    macroquad::Window::from_config(window_conf(), run_window(sim, args.report));
    Ok(())
}

fn run_headless(config: SimConfig, epochs: u32, report: Option<&std::path::Path>) -> Result<()> {
    let mut sim = SimState::new(config, false).context("building simulation")?;
    let mut reports = Vec::with_capacity(epochs as usize);

    for _ in 0..epochs {
        let report = sim.run_epoch().context("running epoch")?;
        reports.push(report);
    }

    if let Some(best) = reports
        .iter()
        .filter_map(|r| r.best().map(|b| (r.epoch, b)))
        .max_by(|(_, a), (_, b)| a.fitness.total_cmp(&b.fitness))
    {
        info!(
            epoch = best.0,
            agent = best.1.index,
            fitness = best.1.fitness,
            laps = best.1.laps,
            "best agent across run"
        );
    }

    if let Some(path) = report {
        reporting::write_json(&reports, path)?;
        info!(path = %path.display(), epochs = reports.len(), "wrote reports");
    }
    Ok(())
}

fn poll_input() -> InputState {
    InputState {
        up: is_key_down(KeyCode::Up),
        down: is_key_down(KeyCode::Down),
        left: is_key_down(KeyCode::Left),
        right: is_key_down(KeyCode::Right),
    }
}

/// One fixed step plus bookkeeping. Report write failures are logged, not fatal.
fn step(
    sim: &mut SimState,
    stats: &mut SimStats,
    input: InputState,
    report_path: Option<&std::path::Path>,
) -> Result<(), SimError> {
    match sim.tick(input)? {
        Some(report) => {
            stats.record_epoch(&report);
            if let Some(path) = report_path {
                if let Err(e) = report.write_json(path) {
                    warn!(error = %e, "failed to write epoch report");
                }
            }
        }
        None => stats.record_tick(sim.alive_count(), sim.best_fitness()),
    }
    Ok(())
}

async fn run_window(mut sim: SimState, report_path: Option<PathBuf>) {
    let mut accumulator = 0.0f64;
    let mut sim_stats = SimStats::new(config::STATS_HISTORY, config::STATS_SAMPLE_INTERVAL);
    let mut ui_state = UiState::default();

    loop {
        let frame_time = get_frame_time() as f64;
        accumulator += frame_time.min(0.1);

        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if is_key_pressed(KeyCode::Space) {
            sim.paused = !sim.paused;
        }
        if is_key_pressed(KeyCode::R) {
            sim.show_rays = !sim.show_rays;
        }

        let input = poll_input();
        let effective_dt = config::FIXED_DT as f64 / sim.speed_multiplier as f64;
        let mut result = Ok(());
        if !sim.paused {
            while accumulator >= effective_dt && result.is_ok() {
                result = step(&mut sim, &mut sim_stats, input, report_path.as_deref());
                accumulator -= effective_dt;
            }
        } else {
            accumulator = 0.0;
            if ui_state.step_requested {
                result = step(&mut sim, &mut sim_stats, input, report_path.as_deref());
            }
        }
        ui_state.step_requested = false;

        if let Err(e) = result {
            error!(error = %e, "simulation halted");
            break;
        }

        renderer::draw(&sim);
        ui::draw_ui(&mut sim, &mut ui_state, &sim_stats);

        next_frame().await;
    }
}
