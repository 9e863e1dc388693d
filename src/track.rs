use macroquad::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CourseConfig;
use crate::error::SimError;
use crate::reward::RewardTrack;

/// Axis-aligned rectangle given as two closed intervals.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: (f32, f32),
    pub y: (f32, f32),
}

impl Bounds {
    pub const fn new(x: (f32, f32), y: (f32, f32)) -> Self {
        Self { x, y }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, p: Vec2) -> bool {
        self.x.0 <= p.x && p.x <= self.x.1 && self.y.0 <= p.y && p.y <= self.y.1
    }

    pub fn is_well_formed(&self) -> bool {
        self.x.0 <= self.x.1 && self.y.0 <= self.y.1
    }

    pub fn min(&self) -> Vec2 {
        vec2(self.x.0, self.y.0)
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.x.1 - self.x.0, self.y.1 - self.y.0)
    }

    pub fn center(&self) -> Vec2 {
        self.min() + self.size() * 0.5
    }
}

/// Drivable space: everything inside the outer bounds and outside the inner wall.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackGeometry {
    pub outer: Bounds,
    pub inner_wall: Bounds,
}

impl TrackGeometry {
    pub fn new(outer: Bounds, inner_wall: Bounds) -> Self {
        Self { outer, inner_wall }
    }

    /// True if the point is on the inner wall or on/past any edge of the outer bounds.
    pub fn is_colliding(&self, p: Vec2) -> bool {
        self.inner_wall.contains(p)
            || p.x <= self.outer.x.0
            || p.x >= self.outer.x.1
            || p.y <= self.outer.y.0
            || p.y >= self.outer.y.1
    }
}

/// Immutable track data shared by every agent in a run.
#[derive(Clone, Debug)]
pub struct Course {
    pub geometry: TrackGeometry,
    pub rewards: RewardTrack,
}

impl Course {
    pub fn from_config(config: &CourseConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            geometry: TrackGeometry::new(config.outer_bounds, config.inner_wall),
            rewards: RewardTrack::new(config.gates.clone())?,
        })
    }
}

impl Default for Course {
    fn default() -> Self {
        let config = CourseConfig::default();
        Self {
            geometry: TrackGeometry::new(config.outer_bounds, config.inner_wall),
            rewards: RewardTrack::from_valid(config.gates),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    fn geometry() -> TrackGeometry {
        TrackGeometry::new(config::OUTER_BOUNDS, config::INNER_WALL)
    }

    #[test]
    fn corridor_is_free() {
        let g = geometry();
        assert!(!g.is_colliding(vec2(50.0, 50.0)));
        assert!(!g.is_colliding(vec2(750.0, 400.0)));
        assert!(!g.is_colliding(vec2(99.9, 99.9)));
        assert!(!g.is_colliding(vec2(400.0, 700.5)));
    }

    #[test]
    fn inner_wall_edges_are_inclusive() {
        let g = geometry();
        assert!(g.is_colliding(vec2(100.0, 100.0)));
        assert!(g.is_colliding(vec2(700.0, 700.0)));
        assert!(g.is_colliding(vec2(100.0, 400.0)));
        assert!(g.is_colliding(vec2(400.0, 400.0)));
    }

    #[test]
    fn outer_bounds_are_inclusive_on_every_side() {
        let g = geometry();
        assert!(g.is_colliding(vec2(0.0, 50.0)));
        assert!(g.is_colliding(vec2(800.0, 50.0)));
        assert!(g.is_colliding(vec2(50.0, 0.0)));
        assert!(g.is_colliding(vec2(50.0, 800.0)));
        assert!(g.is_colliding(vec2(-5.0, 400.0)));
        assert!(g.is_colliding(vec2(400.0, 812.0)));
        assert!(!g.is_colliding(vec2(0.5, 50.0)));
    }

    #[test]
    fn bounds_contains_is_closed() {
        let b = Bounds::new((0.0, 100.0), (100.0, 110.0));
        assert!(b.contains(vec2(0.0, 100.0)));
        assert!(b.contains(vec2(100.0, 110.0)));
        assert!(!b.contains(vec2(100.1, 105.0)));
        assert!(!b.contains(vec2(50.0, 99.9)));
        assert_eq!(b.center(), vec2(50.0, 105.0));
    }

    #[test]
    fn course_from_config_rejects_empty_gate_list() {
        let mut cfg = CourseConfig::default();
        cfg.gates.clear();
        assert!(Course::from_config(&cfg).is_err());
        assert_eq!(Course::default().rewards.len(), config::REWARD_GATES.len());
    }
}
