use macroquad::prelude::*;

use crate::brain::{Decision, DecisionCache, Policy};
use crate::error::SimError;
use crate::physics;
use crate::sensory::SensorVector;

/// Directional keys held this tick. Polled by the caller, never by the core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// What a controller may look at when choosing a move.
#[derive(Clone, Copy, Debug)]
pub struct ControlContext<'a> {
    pub sensors: &'a SensorVector,
    pub input: InputState,
    /// Per-axis distance for this tick.
    pub step: f32,
}

/// Turns the agent's view of the world into per-axis position deltas.
pub trait Controller {
    fn decide_move(&mut self, ctx: &ControlContext<'_>) -> Result<Vec2, SimError>;

    /// Drop any per-epoch state.
    fn reset(&mut self) {}
}

/// Keyboard driven; ignores sensors.
#[derive(Clone, Copy, Debug, Default)]
pub struct HumanController;

impl Controller for HumanController {
    fn decide_move(&mut self, ctx: &ControlContext<'_>) -> Result<Vec2, SimError> {
        Ok(physics::input_delta(ctx.input, ctx.step))
    }
}

/// Drives the agent from a [`Policy`], consulting it only when the sensor
/// reading changes.
#[derive(Clone, Debug)]
pub struct PolicyController<P> {
    policy: P,
    cache: DecisionCache,
}

impl<P: Policy> PolicyController<P> {
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            cache: DecisionCache::new(),
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Swap in a new policy. The cached decision belonged to the old one.
    pub fn replace_policy(&mut self, policy: P) -> P {
        self.cache.clear();
        std::mem::replace(&mut self.policy, policy)
    }

    pub fn cache(&self) -> &DecisionCache {
        &self.cache
    }

    pub fn last_decision(&self) -> Option<Decision> {
        self.cache.last_decision()
    }
}

impl<P: Policy> Controller for PolicyController<P> {
    fn decide_move(&mut self, ctx: &ControlContext<'_>) -> Result<Vec2, SimError> {
        let decision = self.cache.decide(ctx.sensors, &mut self.policy)?;
        Ok(physics::decision_delta(decision, ctx.step))
    }

    fn reset(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::tests::{FailingPolicy, ScriptedPolicy};

    fn ctx(sensors: &SensorVector, input: InputState) -> ControlContext<'_> {
        ControlContext {
            sensors,
            input,
            step: 3.0,
        }
    }

    #[test]
    fn human_controller_follows_keys_only() {
        let mut human = HumanController;
        let input = InputState {
            down: true,
            left: true,
            ..Default::default()
        };
        let delta = human.decide_move(&ctx(&SensorVector([true; 8]), input)).unwrap();
        assert_eq!(delta, vec2(-3.0, -3.0));
    }

    #[test]
    fn policy_controller_ignores_keys_and_caches() {
        let mut controller = PolicyController::new(ScriptedPolicy::new(0.4, 0.0));
        let input = InputState {
            left: true,
            ..Default::default()
        };
        let sensors = SensorVector::CLEAR;

        for _ in 0..4 {
            let delta = controller.decide_move(&ctx(&sensors, input)).unwrap();
            assert_eq!(delta, vec2(3.0, 0.0));
        }
        assert_eq!(controller.policy().calls, 1);

        controller.reset();
        controller.decide_move(&ctx(&sensors, input)).unwrap();
        assert_eq!(controller.policy().calls, 2);
    }

    #[test]
    fn replacing_policy_drops_cached_decision() {
        let mut controller = PolicyController::new(ScriptedPolicy::new(1.0, 1.0));
        controller
            .decide_move(&ctx(&SensorVector::CLEAR, InputState::default()))
            .unwrap();
        let old = controller.replace_policy(ScriptedPolicy::new(-1.0, -1.0));
        assert_eq!(old.calls, 1);
        assert_eq!(controller.last_decision(), None);
        let delta = controller
            .decide_move(&ctx(&SensorVector::CLEAR, InputState::default()))
            .unwrap();
        assert_eq!(delta, vec2(-3.0, -3.0));
    }

    #[test]
    fn policy_errors_surface_as_sim_errors() {
        let mut controller = PolicyController::new(FailingPolicy);
        let err = controller
            .decide_move(&ctx(&SensorVector::CLEAR, InputState::default()))
            .unwrap_err();
        assert!(matches!(err, SimError::Policy(_)));
    }
}
