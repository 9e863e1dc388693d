use macroquad::prelude::*;
use serde::Serialize;
use tracing::trace;

use crate::config::AgentParams;
use crate::controller::{ControlContext, Controller, InputState};
use crate::error::SimError;
use crate::physics;
use crate::reward::{GateCapture, RewardProgress};
use crate::sensory::{SensorState, SensorVector};
use crate::track::Course;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// A bounding-box corner touched a wall. Punished.
    Collision,
    /// Went too long without a gate reward. Not punished.
    Starvation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentStatus {
    Alive,
    Dead(DeathCause),
}

/// Something noteworthy that happened during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentEvent {
    Gate(GateCapture),
    Died(DeathCause),
}

/// Read-only view for whatever draws agents.
pub trait Visible {
    fn position(&self) -> Vec2;
    fn half_extents(&self) -> Vec2;
    fn is_visible(&self) -> bool;
}

/// A single track runner. Owns all of its mutable state, so agents can be
/// stepped independently against a shared [`Course`].
#[derive(Clone, Debug)]
pub struct Agent<C> {
    params: AgentParams,
    half: Vec2,
    pos: Vec2,
    sensors: SensorState,
    progress: RewardProgress,
    status: AgentStatus,
    ticks_alive: u64,
    controller: C,
}

impl<C: Controller> Agent<C> {
    pub fn new(params: AgentParams, controller: C) -> Self {
        let half = params.half_extents();
        let pos = params.spawn_point();
        Self {
            params,
            half,
            pos,
            sensors: SensorState::default(),
            progress: RewardProgress::default(),
            status: AgentStatus::Alive,
            ticks_alive: 0,
            controller,
        }
    }

    /// Back to spawn, alive, with zero fitness. Safe in any state.
    pub fn reset(&mut self) {
        self.pos = self.params.spawn_point();
        self.sensors = SensorState::default();
        self.progress = RewardProgress::default();
        self.status = AgentStatus::Alive;
        self.ticks_alive = 0;
        self.controller.reset();
    }

    /// Advance one tick. Dead agents are left untouched.
    ///
    /// Order: starvation clock, sensors, move, death checks, rewards. Rewards
    /// are not paid on the tick the agent dies.
    pub fn update(
        &mut self,
        course: &Course,
        dt: f32,
        input: InputState,
    ) -> Result<Option<AgentEvent>, SimError> {
        if !self.is_alive() {
            return Ok(None);
        }

        self.progress.time_since_reward += dt * self.params.starvation_clock_scale;
        self.sensors
            .refresh(&course.geometry, self.pos, self.half, self.params.sight);

        let ctx = ControlContext {
            sensors: &self.sensors.current,
            input,
            step: physics::step_size(self.params.speed, dt),
        };
        let delta = self.controller.decide_move(&ctx)?;
        self.pos += delta;
        self.ticks_alive += 1;

        if physics::hits_boundary(&course.geometry, self.pos, self.half) {
            self.progress.fitness -= self.params.death_punishment;
            return Ok(Some(self.die(DeathCause::Collision)));
        }
        if self.progress.time_since_reward >= self.params.survival_time_without_reward {
            return Ok(Some(self.die(DeathCause::Starvation)));
        }

        let capture = course
            .rewards
            .update_fitness(&mut self.progress, self.pos, &self.params);
        if let Some(capture) = capture {
            trace!(
                gate = capture.gate,
                lap = capture.lap_completed,
                fitness = self.progress.fitness,
                "gate captured"
            );
        }
        Ok(capture.map(AgentEvent::Gate))
    }

    fn die(&mut self, cause: DeathCause) -> AgentEvent {
        self.status = AgentStatus::Dead(cause);
        AgentEvent::Died(cause)
    }

    pub fn is_alive(&self) -> bool {
        self.status == AgentStatus::Alive
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        match self.status {
            AgentStatus::Alive => None,
            AgentStatus::Dead(cause) => Some(cause),
        }
    }

    pub fn fitness(&self) -> f32 {
        self.progress.fitness
    }

    pub fn progress(&self) -> &RewardProgress {
        &self.progress
    }

    pub fn sensors(&self) -> &SensorVector {
        &self.sensors.current
    }

    pub fn previous_sensors(&self) -> &SensorVector {
        &self.sensors.previous
    }

    pub fn ticks_alive(&self) -> u64 {
        self.ticks_alive
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }
}

impl<C> Visible for Agent<C> {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn half_extents(&self) -> Vec2 {
        self.half
    }

    fn is_visible(&self) -> bool {
        self.status == AgentStatus::Alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::tests::{FailingPolicy, ScriptedPolicy};
    use crate::config;
    use crate::controller::{HumanController, PolicyController};

    fn scripted(params: AgentParams, x: f32, y: f32) -> Agent<PolicyController<ScriptedPolicy>> {
        Agent::new(params, PolicyController::new(ScriptedPolicy::new(x, y)))
    }

    fn spawn_at(x: f32, y: f32) -> AgentParams {
        AgentParams {
            spawn: [x, y],
            ..Default::default()
        }
    }

    #[test]
    fn collision_death_costs_exactly_the_punishment() {
        let course = Course::default();
        let params = AgentParams {
            alive_reward: 1.0,
            ..spawn_at(13.0, 50.0)
        };
        let mut agent = scripted(params, -1.0, 0.0);

        let event = agent.update(&course, config::FIXED_DT, InputState::default()).unwrap();

        assert_eq!(event, Some(AgentEvent::Died(DeathCause::Collision)));
        assert_eq!(agent.position(), vec2(10.0, 50.0));
        assert_eq!(agent.fitness(), -config::DEATH_PUNISHMENT);
        assert!(!agent.is_visible());
    }

    #[test]
    fn starvation_death_is_free_and_skips_death_tick_reward() {
        let course = Course::default();
        let params = AgentParams {
            alive_reward: 1.0,
            ..Default::default()
        };
        let mut agent = scripted(params, 0.0, 0.0);

        // clock runs at 3x dt: 3, 6, 9, 12, 15
        for tick in 1..=4 {
            let event = agent.update(&course, 1.0, InputState::default()).unwrap();
            assert_eq!(event, None, "tick {tick}");
        }
        let event = agent.update(&course, 1.0, InputState::default()).unwrap();

        assert_eq!(event, Some(AgentEvent::Died(DeathCause::Starvation)));
        assert_eq!(agent.fitness(), 4.0);
        assert_eq!(agent.death_cause(), Some(DeathCause::Starvation));
    }

    #[test]
    fn dead_agent_ignores_updates() {
        let course = Course::default();
        let mut agent = scripted(spawn_at(13.0, 50.0), -1.0, 0.0);
        agent.update(&course, config::FIXED_DT, InputState::default()).unwrap();
        let frozen = (agent.position(), agent.fitness(), agent.status());

        for dt in [0.0, config::FIXED_DT, 1.0, 100.0] {
            let event = agent.update(&course, dt, InputState::default()).unwrap();
            assert_eq!(event, None);
        }

        assert_eq!((agent.position(), agent.fitness(), agent.status()), frozen);
        assert_eq!(agent.controller().policy().calls, 1);
    }

    #[test]
    fn reset_restores_spawn_state() {
        let course = Course::default();
        let params = AgentParams {
            alive_reward: 1.0,
            ..spawn_at(50.0, 105.0)
        };
        // gate 0 on the first tick, then left into the outer wall
        let mut agent = scripted(params, -1.0, 0.0);
        while agent.is_alive() {
            agent.update(&course, config::FIXED_DT, InputState::default()).unwrap();
        }
        assert_eq!(agent.fitness(), 13.0);
        assert_eq!(agent.death_cause(), Some(DeathCause::Collision));

        agent.reset();

        assert!(agent.is_alive());
        assert!(agent.is_visible());
        assert_eq!(agent.fitness(), 0.0);
        assert_eq!(agent.progress().next_gate, 0);
        assert_eq!(agent.progress().time_since_reward, 0.0);
        assert_eq!(agent.position(), vec2(50.0, 105.0));
        assert_eq!(*agent.sensors(), SensorVector::CLEAR);
        assert_eq!(agent.ticks_alive(), 0);

        // reset is also fine on a live agent
        agent.reset();
        assert!(agent.is_alive());
    }

    #[test]
    fn spawning_inside_a_later_gate_earns_nothing() {
        let course = Course::default();
        let mut agent = scripted(spawn_at(50.0, 405.0), 0.0, 0.0);
        for _ in 0..60 {
            assert_eq!(
                agent.update(&course, config::FIXED_DT, InputState::default()).unwrap(),
                None
            );
        }
        assert!(agent.is_alive());
        assert_eq!(agent.fitness(), 0.0);
        assert_eq!(agent.progress().next_gate, 0);
    }

    #[test]
    fn driving_up_the_corridor_captures_gate_zero() {
        let course = Course::default();
        let mut agent = scripted(AgentParams::default(), 0.0, 1.0);
        let mut captured = None;

        // 3 units per tick from y=50 reaches the gate at y=101
        for _ in 0..17 {
            if let Some(AgentEvent::Gate(c)) = agent
                .update(&course, config::FIXED_DT, InputState::default())
                .unwrap()
            {
                captured = Some(c);
            }
        }

        assert_eq!(agent.position(), vec2(50.0, 101.0));
        assert_eq!(captured.map(|c| c.gate), Some(0));
        assert_eq!(agent.fitness(), config::GATE_REWARD);
        assert_eq!(agent.progress().next_gate, 1);
        assert_eq!(agent.progress().time_since_reward, 0.0);
        // open corridor the whole way, so the policy ran once
        assert_eq!(agent.controller().policy().calls, 1);
    }

    #[test]
    fn previous_sensors_lag_current_by_one_tick() {
        let course = Course::default();
        let mut agent = scripted(spawn_at(22.0, 50.0), -1.0, 0.0);

        agent.update(&course, config::FIXED_DT, InputState::default()).unwrap();
        let first = *agent.sensors();
        assert_eq!(*agent.previous_sensors(), SensorVector::CLEAR);

        agent.update(&course, config::FIXED_DT, InputState::default()).unwrap();
        assert_eq!(*agent.previous_sensors(), first);
        assert_ne!(*agent.sensors(), first);
        assert_eq!(agent.controller().policy().calls, 2);
    }

    #[test]
    fn human_agent_moves_diagonally_from_input() {
        let course = Course::default();
        let mut agent = Agent::new(AgentParams::default(), HumanController);
        let input = InputState {
            up: true,
            right: true,
            ..Default::default()
        };
        agent.update(&course, config::FIXED_DT, input).unwrap();
        assert_eq!(agent.position(), vec2(53.0, 53.0));
        agent.update(&course, config::FIXED_DT, InputState::default()).unwrap();
        assert_eq!(agent.position(), vec2(53.0, 53.0));
    }

    #[test]
    fn policy_failure_propagates_to_caller() {
        let course = Course::default();
        let mut agent = Agent::new(AgentParams::default(), PolicyController::new(FailingPolicy));
        let err = agent
            .update(&course, config::FIXED_DT, InputState::default())
            .unwrap_err();
        assert!(matches!(err, SimError::Policy(_)));
        assert!(agent.is_alive());
    }
}
