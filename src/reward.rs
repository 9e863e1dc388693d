use macroquad::prelude::*;
use serde::Serialize;

use crate::config::AgentParams;
use crate::error::SimError;
use crate::track::Bounds;

/// Per-agent reward bookkeeping. Reset wholesale between epochs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RewardProgress {
    pub fitness: f32,
    /// Index of the only gate that can currently pay out.
    pub next_gate: usize,
    pub time_since_reward: f32,
    pub gates_captured: u32,
    pub laps: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GateCapture {
    pub gate: usize,
    pub lap_completed: bool,
}

/// Ordered reward gates. Only `gates[next_gate]` is ever checked, so gates
/// cannot be skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardTrack {
    gates: Vec<Bounds>,
}

impl RewardTrack {
    pub fn new(gates: Vec<Bounds>) -> Result<Self, SimError> {
        if gates.is_empty() {
            return Err(SimError::InvalidConfig(
                "reward track needs at least one gate".to_string(),
            ));
        }
        Ok(Self::from_valid(gates))
    }

    pub(crate) fn from_valid(gates: Vec<Bounds>) -> Self {
        debug_assert!(!gates.is_empty());
        Self { gates }
    }

    pub fn gates(&self) -> &[Bounds] {
        &self.gates
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Pay the per-tick alive reward, then the gate (and lap) reward if `pos`
    /// lies inside the next expected gate.
    pub fn update_fitness(
        &self,
        progress: &mut RewardProgress,
        pos: Vec2,
        params: &AgentParams,
    ) -> Option<GateCapture> {
        // An out-of-range index means the wrap below was bypassed; indexing panics.
        let gate = self.gates[progress.next_gate];
        progress.fitness += params.alive_reward;

        if !gate.contains(pos) {
            return None;
        }

        let captured = progress.next_gate;
        progress.fitness += params.gate_reward;
        progress.time_since_reward = 0.0;
        progress.gates_captured += 1;

        let lap_completed = captured == self.gates.len() - 1;
        if lap_completed {
            progress.next_gate = 0;
            progress.fitness += params.lap_reward;
            progress.laps += 1;
        } else {
            progress.next_gate += 1;
        }

        Some(GateCapture {
            gate: captured,
            lap_completed,
        })
    }
}
