// All tunable simulation constants in one place.

use std::path::Path;

use macroquad::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::track::Bounds;

// Track (hardcoded for the 800x800 map)
pub const TRACK_SIZE: f32 = 800.0;
pub const OUTER_BOUNDS: Bounds = Bounds::new((0.0, TRACK_SIZE), (0.0, TRACK_SIZE));
pub const INNER_WALL: Bounds = Bounds::new((100.0, 700.0), (100.0, 700.0));

/// Reward gates in the order they must be crossed, counter-clockwise from the
/// bottom-left corridor.
pub const REWARD_GATES: [Bounds; 16] = [
    Bounds::new((0.0, 100.0), (100.0, 110.0)),
    Bounds::new((0.0, 100.0), (200.0, 210.0)),
    Bounds::new((0.0, 100.0), (400.0, 410.0)),
    Bounds::new((0.0, 100.0), (700.0, 710.0)),
    Bounds::new((100.0, 110.0), (700.0, 800.0)),
    Bounds::new((200.0, 210.0), (700.0, 800.0)),
    Bounds::new((400.0, 410.0), (700.0, 800.0)),
    Bounds::new((700.0, 710.0), (700.0, 800.0)),
    Bounds::new((700.0, 800.0), (690.0, 700.0)),
    Bounds::new((700.0, 800.0), (390.0, 400.0)),
    Bounds::new((700.0, 800.0), (190.0, 200.0)),
    Bounds::new((700.0, 800.0), (90.0, 100.0)),
    Bounds::new((690.0, 700.0), (0.0, 100.0)),
    Bounds::new((390.0, 400.0), (0.0, 100.0)),
    Bounds::new((190.0, 200.0), (0.0, 100.0)),
    Bounds::new((90.0, 100.0), (0.0, 100.0)),
];

// Agent body and senses
pub const AGENT_WIDTH: f32 = 20.0;
pub const AGENT_HEIGHT: f32 = 20.0;
pub const SPAWN_POINT: Vec2 = Vec2::new(50.0, 50.0);
pub const AGENT_SIGHT: f32 = 10.0;
pub const AGENT_SPEED: f32 = 200.0;
pub const NUM_SENSOR_RAYS: usize = 8;

// Rewards and fitness
pub const ALIVE_REWARD: f32 = 0.0; // added every live tick
pub const GATE_REWARD: f32 = 100.0;
pub const LAP_REWARD: f32 = 10_000.0;
pub const DEATH_PUNISHMENT: f32 = 100.0;
pub const SURVIVAL_TIME_WITHOUT_REWARD: f32 = 15.0;
pub const STARVATION_CLOCK_SCALE: f32 = 3.0;

// Simulation
pub const FIXED_DT: f32 = 1.0 / 60.0;
pub const DEFAULT_POPULATION: usize = 24;
pub const DEFAULT_SEED: u64 = 42;
pub const MAX_EPOCH_TICKS: u64 = 60 * 60 * 3;

// Policy network
pub const POLICY_HIDDEN_NEURONS: usize = 6;
pub const POLICY_OUTPUTS: usize = 2;

// Stats
pub const STATS_HISTORY: usize = 1000;
pub const STATS_SAMPLE_INTERVAL: u32 = 10;

/// Static parameters of a single agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentParams {
    pub width: f32,
    pub height: f32,
    pub spawn: [f32; 2],
    pub sight: f32,
    pub speed: f32,
    pub alive_reward: f32,
    pub gate_reward: f32,
    pub lap_reward: f32,
    pub death_punishment: f32,
    pub survival_time_without_reward: f32,
    /// Multiplier applied to `dt` when advancing the starvation clock.
    pub starvation_clock_scale: f32,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            width: AGENT_WIDTH,
            height: AGENT_HEIGHT,
            spawn: SPAWN_POINT.to_array(),
            sight: AGENT_SIGHT,
            speed: AGENT_SPEED,
            alive_reward: ALIVE_REWARD,
            gate_reward: GATE_REWARD,
            lap_reward: LAP_REWARD,
            death_punishment: DEATH_PUNISHMENT,
            survival_time_without_reward: SURVIVAL_TIME_WITHOUT_REWARD,
            starvation_clock_scale: STARVATION_CLOCK_SCALE,
        }
    }
}

impl AgentParams {
    pub fn half_extents(&self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }

    pub fn spawn_point(&self) -> Vec2 {
        Vec2::from_array(self.spawn)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let finite = [
            self.width,
            self.height,
            self.spawn[0],
            self.spawn[1],
            self.sight,
            self.speed,
            self.alive_reward,
            self.gate_reward,
            self.lap_reward,
            self.death_punishment,
            self.survival_time_without_reward,
            self.starvation_clock_scale,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(SimError::InvalidConfig(
                "agent parameters must be finite".to_string(),
            ));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "agent size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.speed < 0.0 || self.sight < 0.0 {
            return Err(SimError::InvalidConfig(
                "agent speed and sight must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Track layout: walls plus the ordered reward gates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseConfig {
    pub outer_bounds: Bounds,
    pub inner_wall: Bounds,
    pub gates: Vec<Bounds>,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            outer_bounds: OUTER_BOUNDS,
            inner_wall: INNER_WALL,
            gates: REWARD_GATES.to_vec(),
        }
    }
}

impl CourseConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.gates.is_empty() {
            return Err(SimError::InvalidConfig(
                "course needs at least one reward gate".to_string(),
            ));
        }
        let zones = [("outer bounds", &self.outer_bounds), ("inner wall", &self.inner_wall)];
        for (name, zone) in zones {
            if !zone.is_well_formed() {
                return Err(SimError::InvalidConfig(format!("{name} interval is inverted")));
            }
        }
        if let Some(idx) = self.gates.iter().position(|g| !g.is_well_formed()) {
            return Err(SimError::InvalidConfig(format!("gate {idx} interval is inverted")));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub agent: AgentParams,
    pub course: CourseConfig,
    pub population: usize,
    pub seed: u64,
    pub max_epoch_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            agent: AgentParams::default(),
            course: CourseConfig::default(),
            population: DEFAULT_POPULATION,
            seed: DEFAULT_SEED,
            max_epoch_ticks: MAX_EPOCH_TICKS,
        }
    }
}

impl SimConfig {
    /// Read a JSON config file. Fields missing from the file keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SimError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| SimError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.agent.validate()?;
        self.course.validate()?;
        if self.max_epoch_ticks == 0 {
            return Err(SimError::InvalidConfig(
                "max_epoch_ticks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
