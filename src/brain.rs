use ::rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{NUM_SENSOR_RAYS, POLICY_HIDDEN_NEURONS, POLICY_OUTPUTS};
use crate::error::PolicyError;
use crate::sensory::SensorVector;

/// Movement intent on each axis. Only the sign of a component is used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub x: f32,
    pub y: f32,
}

impl Decision {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Maps a sensor vector to a movement decision.
pub trait Policy {
    /// Short identifier used in logs and reports.
    fn kind(&self) -> &'static str;

    fn decide(&mut self, sensors: &SensorVector) -> Result<Decision, PolicyError>;
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn decide(&mut self, sensors: &SensorVector) -> Result<Decision, PolicyError> {
        (**self).decide(sensors)
    }
}

/// Remembers the last sensor vector handed to the policy and the decision it
/// produced, so the policy only runs when the reading changes.
#[derive(Clone, Debug, Default)]
pub struct DecisionCache {
    last: Option<(SensorVector, Decision)>,
    policy_calls: u64,
}

impl DecisionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decide<P: Policy + ?Sized>(
        &mut self,
        sensors: &SensorVector,
        policy: &mut P,
    ) -> Result<Decision, PolicyError> {
        if let Some((cached_sensors, cached_decision)) = self.last {
            if cached_sensors == *sensors {
                return Ok(cached_decision);
            }
        }

        let decision = policy.decide(sensors)?;
        self.policy_calls += 1;
        self.last = Some((*sensors, decision));
        Ok(decision)
    }

    pub fn last_decision(&self) -> Option<Decision> {
        self.last.map(|(_, d)| d)
    }

    pub fn policy_calls(&self) -> u64 {
        self.policy_calls
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

const INPUT_WEIGHTS: usize = POLICY_HIDDEN_NEURONS * (NUM_SENSOR_RAYS + 1);
const OUTPUT_WEIGHTS: usize = POLICY_OUTPUTS * (POLICY_HIDDEN_NEURONS + 1);

/// Fixed-topology feed-forward network: 8 sensor inputs, one tanh hidden layer,
/// two tanh outputs (x, y).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeuralPolicy {
    /// Row-major `[hidden][input + bias]`.
    pub hidden_weights: Vec<f32>,
    /// Row-major `[output][hidden + bias]`.
    pub output_weights: Vec<f32>,
}

impl NeuralPolicy {
    pub const KIND: &'static str = "neural.feedforward";

    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            hidden_weights: (0..INPUT_WEIGHTS).map(|_| rng.gen_range(-1.0..1.0)).collect(),
            output_weights: (0..OUTPUT_WEIGHTS).map(|_| rng.gen_range(-1.0..1.0)).collect(),
        }
    }

    fn forward(&self, inputs: &[f32; NUM_SENSOR_RAYS]) -> [f32; POLICY_OUTPUTS] {
        let in_row = NUM_SENSOR_RAYS + 1;
        let mut hidden = [0.0f32; POLICY_HIDDEN_NEURONS];
        for (h, out) in hidden.iter_mut().enumerate() {
            let row = &self.hidden_weights[h * in_row..(h + 1) * in_row];
            let sum: f32 = row[NUM_SENSOR_RAYS]
                + inputs.iter().zip(row).map(|(i, w)| i * w).sum::<f32>();
            *out = sum.tanh();
        }

        let hid_row = POLICY_HIDDEN_NEURONS + 1;
        let mut outputs = [0.0f32; POLICY_OUTPUTS];
        for (o, out) in outputs.iter_mut().enumerate() {
            let row = &self.output_weights[o * hid_row..(o + 1) * hid_row];
            let sum: f32 = row[POLICY_HIDDEN_NEURONS]
                + hidden.iter().zip(row).map(|(h, w)| h * w).sum::<f32>();
            *out = sum.tanh();
        }
        outputs
    }
}

impl Policy for NeuralPolicy {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn decide(&mut self, sensors: &SensorVector) -> Result<Decision, PolicyError> {
        if self.hidden_weights.len() != INPUT_WEIGHTS || self.output_weights.len() != OUTPUT_WEIGHTS
        {
            return Err(PolicyError::new(
                Self::KIND,
                format!(
                    "expected {INPUT_WEIGHTS}+{OUTPUT_WEIGHTS} weights, got {}+{}",
                    self.hidden_weights.len(),
                    self.output_weights.len()
                ),
            ));
        }

        let [x, y] = self.forward(&sensors.as_inputs());
        if !(x.is_finite() && y.is_finite()) {
            return Err(PolicyError::new(Self::KIND, "non-finite output"));
        }
        Ok(Decision::new(x, y))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ::rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Returns a fixed decision and counts how often it is asked.
    pub(crate) struct ScriptedPolicy {
        pub decision: Decision,
        pub calls: u32,
    }

    impl ScriptedPolicy {
        pub(crate) fn new(x: f32, y: f32) -> Self {
            Self {
                decision: Decision::new(x, y),
                calls: 0,
            }
        }
    }

    impl Policy for ScriptedPolicy {
        fn kind(&self) -> &'static str {
            "scripted"
        }

        fn decide(&mut self, _sensors: &SensorVector) -> Result<Decision, PolicyError> {
            self.calls += 1;
            Ok(self.decision)
        }
    }

    pub(crate) struct FailingPolicy;

    impl Policy for FailingPolicy {
        fn kind(&self) -> &'static str {
            "failing"
        }

        fn decide(&mut self, _sensors: &SensorVector) -> Result<Decision, PolicyError> {
            Err(PolicyError::new("failing", "no decision"))
        }
    }

    fn with_hit(idx: usize) -> SensorVector {
        let mut flags = [false; NUM_SENSOR_RAYS];
        flags[idx] = true;
        SensorVector(flags)
    }

    #[test]
    fn unchanged_sensors_reuse_cached_decision() {
        let mut cache = DecisionCache::new();
        let mut policy = ScriptedPolicy::new(1.0, -1.0);

        let first = cache.decide(&SensorVector::CLEAR, &mut policy).unwrap();
        policy.decision = Decision::new(-1.0, 1.0);
        let second = cache.decide(&SensorVector::CLEAR, &mut policy).unwrap();

        assert_eq!(first, second);
        assert_eq!(policy.calls, 1);
        assert_eq!(cache.policy_calls(), 1);
    }

    #[test]
    fn changed_sensors_call_the_policy_again() {
        let mut cache = DecisionCache::new();
        let mut policy = ScriptedPolicy::new(1.0, 0.0);

        cache.decide(&SensorVector::CLEAR, &mut policy).unwrap();
        policy.decision = Decision::new(-1.0, 0.0);
        let d = cache.decide(&with_hit(2), &mut policy).unwrap();
        assert_eq!(d, Decision::new(-1.0, 0.0));

        // back to the earlier reading still counts as a change
        cache.decide(&SensorVector::CLEAR, &mut policy).unwrap();
        assert_eq!(policy.calls, 3);
    }

    #[test]
    fn clear_forces_a_fresh_decision() {
        let mut cache = DecisionCache::new();
        let mut policy = ScriptedPolicy::new(1.0, 1.0);
        cache.decide(&SensorVector::CLEAR, &mut policy).unwrap();
        cache.clear();
        assert_eq!(cache.last_decision(), None);
        cache.decide(&SensorVector::CLEAR, &mut policy).unwrap();
        assert_eq!(policy.calls, 2);
    }

    #[test]
    fn policy_failure_leaves_cache_untouched() {
        let mut cache = DecisionCache::new();
        let mut ok = ScriptedPolicy::new(1.0, 1.0);
        cache.decide(&SensorVector::CLEAR, &mut ok).unwrap();

        let err = cache.decide(&with_hit(0), &mut FailingPolicy).unwrap_err();
        assert_eq!(err.kind, "failing");
        assert_eq!(cache.last_decision(), Some(Decision::new(1.0, 1.0)));
        assert_eq!(cache.policy_calls(), 1);
    }

    #[test]
    fn neural_policy_is_deterministic_and_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut policy = NeuralPolicy::random(&mut rng);
        let mut twin = policy.clone();

        for idx in 0..NUM_SENSOR_RAYS {
            let a = policy.decide(&with_hit(idx)).unwrap();
            let b = twin.decide(&with_hit(idx)).unwrap();
            assert_eq!(a, b);
            assert!(a.x.abs() <= 1.0 && a.y.abs() <= 1.0);
        }
    }

    #[test]
    fn neural_policy_rejects_wrong_weight_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut policy = NeuralPolicy::random(&mut rng);
        policy.output_weights.pop();
        assert!(policy.decide(&SensorVector::CLEAR).is_err());
    }
}
