use macroquad::prelude::*;

use crate::agent::{Agent, Visible};
use crate::controller::Controller;
use crate::reward::RewardTrack;
use crate::sensory::ray_points;
use crate::simulation::SimState;
use crate::track::{Bounds, TrackGeometry};

const BG_COLOR: Color = Color::new(0.02, 0.03, 0.08, 1.0);
const ROAD_COLOR: Color = Color::new(0.10, 0.12, 0.16, 1.0);
const WALL_COLOR: Color = Color::new(0.28, 0.30, 0.38, 1.0);
const GATE_COLOR: Color = Color::new(0.9, 0.8, 0.2, 0.18);
const NEXT_GATE_COLOR: Color = Color::new(1.0, 0.85, 0.2, 0.7);
const AGENT_COLOR: Color = Color::new(0.3, 0.75, 1.0, 0.85);
const LEADER_COLOR: Color = Color::new(0.4, 1.0, 0.5, 1.0);
const PLAYER_COLOR: Color = Color::new(1.0, 0.45, 0.3, 1.0);

/// Fits the track into the window with world y pointing up, so "up" input
/// moves up on screen.
fn track_camera(outer: &Bounds) -> Camera2D {
    let size = outer.size();
    let scale = screen_width().min(screen_height());
    Camera2D {
        target: outer.center(),
        zoom: vec2(
            2.0 / size.x * scale / screen_width(),
            2.0 / size.y * scale / screen_height(),
        ),
        ..Default::default()
    }
}

pub fn draw(sim: &SimState) {
    clear_background(BG_COLOR);
    set_camera(&track_camera(&sim.course.geometry.outer));

    draw_track(&sim.course.geometry);

    // highlight the gate the player (or else the leader) is chasing
    let leader = sim
        .population
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_alive())
        .max_by(|(_, a), (_, b)| a.fitness().total_cmp(&b.fitness()))
        .map(|(idx, _)| idx);
    let next_gate = match &sim.player {
        Some(player) if player.is_alive() => Some(player.progress().next_gate),
        _ => leader.map(|idx| sim.population[idx].progress().next_gate),
    };
    draw_gates(&sim.course.rewards, next_gate);

    for (idx, agent) in sim.population.iter().enumerate() {
        let color = if Some(idx) == leader {
            LEADER_COLOR
        } else {
            AGENT_COLOR
        };
        draw_agent(agent, color);
        if sim.show_rays {
            draw_sensor_points(agent);
        }
    }
    if let Some(player) = &sim.player {
        draw_agent(player, PLAYER_COLOR);
        if sim.show_rays {
            draw_sensor_points(player);
        }
    }

    set_default_camera();
    draw_hud(sim, leader);
}

fn draw_track(track: &TrackGeometry) {
    fill_bounds(&track.outer, ROAD_COLOR);
    fill_bounds(&track.inner_wall, WALL_COLOR);
    let o = track.outer.min();
    let s = track.outer.size();
    draw_rectangle_lines(o.x, o.y, s.x, s.y, 4.0, WALL_COLOR);
}

fn draw_gates(rewards: &RewardTrack, next_gate: Option<usize>) {
    for (idx, gate) in rewards.gates().iter().enumerate() {
        let color = if Some(idx) == next_gate {
            NEXT_GATE_COLOR
        } else {
            GATE_COLOR
        };
        fill_bounds(gate, color);
    }
}

fn fill_bounds(b: &Bounds, color: Color) {
    let min = b.min();
    let size = b.size();
    draw_rectangle(min.x, min.y, size.x, size.y, color);
}

/// Dead agents are not drawn.
pub fn draw_agent(agent: &impl Visible, color: Color) {
    if !agent.is_visible() {
        return;
    }
    let pos = agent.position();
    let half = agent.half_extents();
    draw_rectangle(pos.x - half.x, pos.y - half.y, half.x * 2.0, half.y * 2.0, color);
}

fn draw_sensor_points<C: Controller>(agent: &Agent<C>) {
    if !agent.is_alive() {
        return;
    }
    let points = ray_points(agent.position(), agent.half_extents(), agent.params().sight);
    for (point, hit) in points.iter().zip(agent.sensors().0) {
        let color = if hit {
            Color::new(1.0, 0.3, 0.3, 0.9)
        } else {
            Color::new(0.5, 0.5, 0.6, 0.5)
        };
        draw_circle(point.x, point.y, 2.0, color);
    }
}

fn draw_hud(sim: &SimState, leader: Option<usize>) {
    let tc = Color::new(0.7, 0.75, 0.8, 1.0);
    let sh = Color::new(0.0, 0.0, 0.0, 0.5);

    let mut lines = vec![
        format!("FPS: {}", get_fps()),
        format!("Epoch: {}  Tick: {}", sim.epoch, sim.epoch_tick),
        format!("Alive: {}/{}", sim.alive_count(), sim.population.len() + sim.player.iter().count()),
        format!("Best fitness: {:.0}", sim.best_fitness()),
    ];
    if let Some(agent) = leader.map(|idx| &sim.population[idx]) {
        lines.push(format!(
            "Leader: gate {}  policy calls {}",
            agent.progress().next_gate,
            agent.controller().cache().policy_calls()
        ));
    }
    if let Some(player) = &sim.player {
        lines.push(format!(
            "You: {:.0} (gate {}, {} rays blocked)",
            player.fitness(),
            player.progress().next_gate,
            player.sensors().hit_count()
        ));
    }

    for (i, text) in lines.iter().enumerate() {
        let y = 50.0 + i as f32 * 20.0;
        draw_text(text, 11.0, y + 1.0, 18.0, sh);
        draw_text(text, 10.0, y, 18.0, tc);
    }

    if sim.paused {
        let pause_text = "PAUSED (Space to resume)";
        let tw = measure_text(pause_text, None, 24, 1.0).width;
        let x = screen_width() * 0.5 - tw * 0.5;
        draw_text(pause_text, x + 1.0, 61.0, 24.0, sh);
        draw_text(pause_text, x, 60.0, 24.0, Color::new(1.0, 0.8, 0.2, 0.9));
    }
}
