use egui::{Color32, Rect, Stroke};

use crate::stats::{RingBuffer, SimStats};

const PLOT_HEIGHT: f32 = 80.0;
const ALIVE: Color32 = Color32::from_rgb(100, 200, 100);
const BEST: Color32 = Color32::from_rgb(255, 210, 90);
const MEAN: Color32 = Color32::from_rgb(100, 180, 255);
const LAPS: Color32 = Color32::from_rgb(200, 150, 255);

/// A named series drawn into a shared plot.
struct Series<'a> {
    label: &'static str,
    data: &'a RingBuffer,
    color: Color32,
}

pub fn draw_graphs(ctx: &egui::Context, stats: &SimStats) {
    egui::Window::new("Run history")
        .default_pos(egui::pos2(20.0, 420.0))
        .default_size(egui::vec2(360.0, 300.0))
        .resizable(true)
        .show(ctx, |ui| {
            ui.collapsing("This epoch", |ui| {
                plot(ui, &[Series { label: "alive", data: &stats.alive, color: ALIVE }]);
                plot(ui, &[Series { label: "best fitness", data: &stats.best_fitness, color: BEST }]);
            });
            ui.collapsing("Per epoch", |ui| {
                plot(
                    ui,
                    &[
                        Series { label: "best", data: &stats.epoch_best, color: BEST },
                        Series { label: "mean", data: &stats.epoch_mean, color: MEAN },
                    ],
                );
                plot(ui, &[Series { label: "lap rate %", data: &stats.epoch_lap_rate, color: LAPS }]);
            });
        });
}

/// All series share one vertical scale so best and mean stay comparable.
fn plot(ui: &mut egui::Ui, series: &[Series<'_>]) {
    let size = egui::vec2(ui.available_width(), PLOT_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, 2.0, Color32::from_gray(20));

    let (lo, hi) = series
        .iter()
        .flat_map(|s| s.data.iter())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return;
    }

    for s in series.iter().filter(|s| s.data.len() >= 2) {
        let samples: Vec<f32> = s.data.iter().collect();
        let points = to_screen(&samples, rect, lo, hi);
        for pair in points.windows(2) {
            painter.line_segment([pair[0], pair[1]], Stroke::new(1.5, s.color));
        }
    }

    ui.horizontal(|ui| {
        for s in series {
            let latest = s.data.last().map_or(String::new(), |v| format!(" {v:.0}"));
            ui.colored_label(s.color, format!("{}{latest}", s.label));
        }
    });
}

// fitness goes negative, so the floor follows the data
fn to_screen(samples: &[f32], rect: Rect, lo: f32, hi: f32) -> Vec<egui::Pos2> {
    let range = (hi - lo).max(1.0);
    let last = (samples.len() - 1) as f32;
    samples
        .iter()
        .enumerate()
        .map(|(i, v)| {
            egui::pos2(
                rect.left() + i as f32 / last * rect.width(),
                rect.bottom() - (v - lo) / range * rect.height(),
            )
        })
        .collect()
}
