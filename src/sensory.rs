use macroquad::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::NUM_SENSOR_RAYS;
use crate::track::TrackGeometry;

/// One flag per sensing point, `true` when the point is inside a wall.
///
/// Bit order follows [`ray_points`] and is part of the policy contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorVector(pub [bool; NUM_SENSOR_RAYS]);

impl SensorVector {
    pub const CLEAR: Self = Self([false; NUM_SENSOR_RAYS]);

    /// Flags as 0.0 / 1.0 network inputs.
    pub fn as_inputs(&self) -> [f32; NUM_SENSOR_RAYS] {
        self.0.map(|hit| if hit { 1.0 } else { 0.0 })
    }

    pub fn hit_count(&self) -> usize {
        self.0.iter().filter(|hit| **hit).count()
    }
}

/// The 8 sensing points around a box centred at `pos`, walking clockwise from
/// the left side: left, upper-left, top, upper-right, right, lower-right,
/// bottom, lower-left.
pub fn ray_points(pos: Vec2, half: Vec2, sight: f32) -> [Vec2; NUM_SENSOR_RAYS] {
    let reach_x = half.x + sight;
    let reach_y = half.y + sight;

    let p1 = vec2(pos.x - reach_x, pos.y);
    let p2 = vec2(p1.x, p1.y + reach_y);
    let p3 = vec2(pos.x, pos.y + reach_y);
    let p4 = vec2(p3.x + reach_x, p3.y);
    let p5 = vec2(pos.x + reach_x, pos.y);
    let p6 = vec2(p5.x, p5.y - reach_y);
    let p7 = vec2(pos.x, pos.y - reach_y);
    let p8 = vec2(p7.x - reach_x, p7.y);

    [p1, p2, p3, p4, p5, p6, p7, p8]
}

pub fn sense(track: &TrackGeometry, pos: Vec2, half: Vec2, sight: f32) -> SensorVector {
    SensorVector(ray_points(pos, half, sight).map(|p| track.is_colliding(p)))
}

/// Live sensor reading plus the reading from the tick before.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SensorState {
    pub current: SensorVector,
    pub previous: SensorVector,
}

impl SensorState {
    /// Shift `current` into `previous` and store a fresh reading.
    pub fn refresh(&mut self, track: &TrackGeometry, pos: Vec2, half: Vec2, sight: f32) {
        self.previous = self.current;
        self.current = sense(track, pos, half, sight);
    }
}
