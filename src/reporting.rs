use std::path::Path;

use serde::Serialize;

use crate::agent::DeathCause;
use crate::error::SimError;

/// Distribution of final fitness across one epoch's agents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FitnessSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl FitnessSummary {
    pub fn from_fitness(values: impl IntoIterator<Item = f32>) -> Self {
        let mut ranked: Vec<f64> = values.into_iter().map(f64::from).collect();
        if ranked.is_empty() {
            return Self::default();
        }
        ranked.sort_by(f64::total_cmp);

        let count = ranked.len();
        Self {
            count,
            min: ranked[0],
            max: ranked[count - 1],
            mean: ranked.iter().sum::<f64>() / count as f64,
            p50: nearest_rank(&ranked, 50),
            p90: nearest_rank(&ranked, 90),
            p95: nearest_rank(&ranked, 95),
            p99: nearest_rank(&ranked, 99),
        }
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice.
fn nearest_rank(ranked: &[f64], percent: usize) -> f64 {
    let rank = (percent * ranked.len()).div_ceil(100);
    ranked[rank.clamp(1, ranked.len()) - 1]
}

/// Final standing of one agent at the end of an epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResult {
    pub index: usize,
    pub controller: String,
    pub fitness: f32,
    pub gates_captured: u32,
    pub laps: u32,
    pub ticks_alive: u64,
    /// `None` if the epoch hit its tick limit first.
    pub death: Option<DeathCause>,
}

/// Everything an outer optimizer needs from one epoch.
#[derive(Debug, Clone, Serialize)]
pub struct EpochReport {
    pub epoch: u32,
    pub seed: u64,
    pub ticks: u64,
    pub timed_out: bool,
    pub fitness: FitnessSummary,
    /// Share of agents that completed at least one lap, in percent.
    pub lap_rate: f64,
    pub agents: Vec<AgentResult>,
}

impl EpochReport {
    pub fn new(epoch: u32, seed: u64, ticks: u64, timed_out: bool, agents: Vec<AgentResult>) -> Self {
        let lappers = agents.iter().filter(|a| a.laps > 0).count();
        let lap_rate = if agents.is_empty() {
            0.0
        } else {
            lappers as f64 * 100.0 / agents.len() as f64
        };
        Self {
            epoch,
            seed,
            ticks,
            timed_out,
            fitness: FitnessSummary::from_fitness(agents.iter().map(|a| a.fitness)),
            lap_rate,
            agents,
        }
    }

    pub fn best(&self) -> Option<&AgentResult> {
        self.agents
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        write_json(self, path)
    }
}

/// Pretty-print any report (or list of reports) to `path`.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result<(), SimError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(|source| SimError::ReportWrite {
        path: path.to_path_buf(),
        source,
    })
}
