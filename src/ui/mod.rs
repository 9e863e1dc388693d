pub mod graphs;
pub mod toolbar;

use crate::simulation::SimState;
use crate::stats::SimStats;

/// Tracks which UI panels are open.
pub struct UiState {
    pub show_graphs: bool,
    pub step_requested: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_graphs: true,
            step_requested: false,
        }
    }
}

/// Draw all egui UI panels.
pub fn draw_ui(sim: &mut SimState, ui_state: &mut UiState, stats: &SimStats) {
    egui_macroquad::ui(|ctx| {
        toolbar::draw_toolbar(ctx, sim, ui_state);

        if ui_state.show_graphs {
            graphs::draw_graphs(ctx, stats);
        }
    });

    egui_macroquad::draw();
}
