use egui::{Color32, RichText};

use super::UiState;
use crate::simulation::SimState;

const SPEEDS: [f32; 4] = [1.0, 2.0, 5.0, 10.0];
const MUTED: Color32 = Color32::from_rgb(150, 170, 185);
const METRIC: Color32 = Color32::from_rgb(205, 215, 225);

/// Run controls on the first row, epoch metrics on the second.
pub fn draw_toolbar(ctx: &egui::Context, sim: &mut SimState, ui_state: &mut UiState) {
    egui::TopBottomPanel::top("run_controls").show(ctx, |ui| {
        ui.add_space(3.0);
        ui.horizontal_wrapped(|ui| {
            ui.label(
                RichText::new("CIRCUIT")
                    .strong()
                    .color(Color32::from_rgb(255, 210, 90)),
            );
            ui.separator();
            controls(ui, sim, ui_state);
        });
        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| metrics(ui, sim));
        ui.add_space(3.0);
    });
}

fn controls(ui: &mut egui::Ui, sim: &mut SimState, ui_state: &mut UiState) {
    labelled(ui, "Run", |ui| {
        if ui.button(if sim.paused { "Play" } else { "Pause" }).clicked() {
            sim.paused = !sim.paused;
        }
        // only meaningful while paused
        let step = ui.add_enabled(sim.paused, egui::Button::new("Step"));
        if step.clicked() {
            ui_state.step_requested = true;
        }
    });

    labelled(ui, "Speed", |ui| {
        for speed in SPEEDS {
            let active = sim.speed_multiplier == speed;
            if ui.selectable_label(active, format!("{speed}x")).clicked() {
                sim.speed_multiplier = speed;
            }
        }
    });

    labelled(ui, "Show", |ui| {
        ui.toggle_value(&mut sim.show_rays, "Rays");
        ui.toggle_value(&mut ui_state.show_graphs, "Graphs");
    });
}

fn metrics(ui: &mut egui::Ui, sim: &SimState) {
    let alive = sim.alive_count();
    let total = sim.population.len() + usize::from(sim.player.is_some());
    chip(ui, format!("Epoch {}", sim.epoch), METRIC);
    chip(ui, format!("Tick {}/{}", sim.epoch_tick, sim.config.max_epoch_ticks), METRIC);
    chip(ui, format!("Alive {alive}/{total}"), METRIC);
    chip(ui, format!("Best {:.0}", sim.best_fitness()), METRIC);

    if let Some(report) = &sim.last_report {
        let prev = format!(
            "Prev best {:.0} / mean {:.0} / laps {:.0}%",
            report.fitness.max, report.fitness.mean, report.lap_rate
        );
        chip(ui, prev, MUTED);
    }

    if let Some(player) = &sim.player {
        let color = if player.is_alive() {
            Color32::from_rgb(255, 140, 100)
        } else {
            Color32::from_gray(150)
        };
        chip(ui, format!("You {:.0}", player.fitness()), color);
    }
}

fn labelled(ui: &mut egui::Ui, heading: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label(RichText::new(heading).small().color(MUTED));
            add_contents(ui);
        });
    });
}

fn chip(ui: &mut egui::Ui, text: String, color: Color32) {
    ui.group(|ui| {
        ui.label(RichText::new(text).small().color(color));
    });
}
