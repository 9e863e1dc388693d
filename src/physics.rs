use macroquad::prelude::*;

use crate::brain::Decision;
use crate::controller::InputState;
use crate::track::TrackGeometry;

/// Distance moved along one axis this tick, truncated toward zero.
pub fn step_size(speed: f32, dt: f32) -> f32 {
    (speed * dt).trunc()
}

/// Axis deltas for raw directional input. Opposite keys cancel, perpendicular
/// keys combine into a diagonal.
pub fn input_delta(input: InputState, step: f32) -> Vec2 {
    let mut delta = Vec2::ZERO;
    if input.left {
        delta.x -= step;
    }
    if input.right {
        delta.x += step;
    }
    if input.up {
        delta.y += step;
    }
    if input.down {
        delta.y -= step;
    }
    delta
}

/// Axis deltas for a policy decision; magnitude is ignored.
pub fn decision_delta(decision: Decision, step: f32) -> Vec2 {
    vec2(axis_step(decision.x, step), axis_step(decision.y, step))
}

// Exactly zero (and NaN) holds the axis still.
fn axis_step(value: f32, step: f32) -> f32 {
    if value < 0.0 {
        -step
    } else if value > 0.0 {
        step
    } else {
        0.0
    }
}

/// Bounding-box corners: top-left, top-right, bottom-right, bottom-left.
pub fn bounding_corners(pos: Vec2, half: Vec2) -> [Vec2; 4] {
    let size = half * 2.0;
    let top_left = vec2(pos.x - half.x, pos.y + half.y);
    let top_right = vec2(top_left.x + size.x, top_left.y);
    let bottom_right = vec2(top_right.x, top_right.y - size.y);
    let bottom_left = vec2(bottom_right.x - size.x, bottom_right.y);
    [top_left, top_right, bottom_right, bottom_left]
}

/// True if any corner of the box touches a wall.
pub fn hits_boundary(track: &TrackGeometry, pos: Vec2, half: Vec2) -> bool {
    bounding_corners(pos, half)
        .iter()
        .any(|corner| track.is_colliding(*corner))
}
