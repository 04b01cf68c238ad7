use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::view::{Selection, ALL_LOCATIONS, NORMAL_ROW_LIMIT};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – location selector and summary
// ---------------------------------------------------------------------------

/// Render the left panel: location filter plus counts for the current view.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Location");
    ui.separator();

    if state.record_set.is_none() {
        ui.label(if state.is_loading() {
            "Loading…"
        } else {
            "No data loaded."
        });
        return;
    }

    // Collect the click first; `select` needs `&mut state`.
    let mut chosen: Option<Selection> = None;
    let current = state.selection.to_string();

    ui.add_enabled_ui(!state.is_loading(), |ui: &mut Ui| {
        egui::ComboBox::from_id_salt("location_select")
            .selected_text(current.as_str())
            .width(ui.available_width())
            .show_ui(ui, |ui: &mut Ui| {
                if ui
                    .selectable_label(state.selection == Selection::All, ALL_LOCATIONS)
                    .clicked()
                {
                    chosen = Some(Selection::All);
                }
                for loc in &state.locations {
                    let is_current =
                        matches!(&state.selection, Selection::Location(sel) if sel == loc);
                    if ui.selectable_label(is_current, loc.as_str()).clicked() {
                        chosen = Some(Selection::from_control(loc));
                    }
                }
            });
    });

    if let Some(selection) = chosen {
        if selection != state.selection {
            state.select(selection);
        }
    }

    ui.add_space(8.0);
    ui.strong("Summary");
    ui.separator();

    let view = &state.view;
    egui::Grid::new("summary_grid")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("Readings");
            ui.label(view.records.len().to_string());
            ui.end_row();

            ui.label("Anomalies");
            ui.label(RichText::new(view.anomaly_count().to_string()).color(Color32::RED));
            ui.end_row();

            ui.label("Normals");
            ui.label(view.normal_count().to_string());
            ui.end_row();

            ui.label("Table rows");
            ui.label(view.rows.len().to_string());
            ui.end_row();
        });

    ui.add_space(4.0);
    ui.small(format!(
        "Table lists every anomaly and the {NORMAL_ROW_LIMIT} most recent normal readings."
    ));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let open = ui.add_enabled(!state.is_loading(), egui::Button::new("Open…"));
            if open.clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.is_loading() {
            ui.spinner();
            ui.label("Loading…");
        } else if let Some(set) = &state.record_set {
            ui.label(format!(
                "{} readings loaded, {} shown for '{}'",
                set.len(),
                state.view.records.len(),
                state.selection
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open anomaly results")
        .add_filter("Supported files", &["json", "csv"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.begin_load(path);
    }
}
