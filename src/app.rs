use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

/// How often to check an outstanding load for completion.
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GasAnomalyApp {
    pub state: AppState,
}

impl GasAnomalyApp {
    /// Create the app and start loading `initial` in the background.
    pub fn new(initial: PathBuf) -> Self {
        let mut state = AppState::default();
        state.begin_load(initial);
        Self { state }
    }
}

impl eframe::App for GasAnomalyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_load();
        if self.state.is_loading() {
            ctx.request_repaint_after(LOAD_POLL_INTERVAL);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: location filter + summary ----
        egui::SidePanel::left("location_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: anomaly table ----
        if self.state.record_set.is_some() {
            egui::TopBottomPanel::bottom("table_panel")
                .default_height(260.0)
                .resizable(true)
                .show(ctx, |ui| {
                    ui.heading("Readings");
                    table::record_table(ui, &self.state.view);
                });
        }

        // ---- Central panel: pressure chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::pressure_plot(ui, &mut self.state);
        });
    }
}
