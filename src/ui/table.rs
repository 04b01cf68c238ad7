use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::view::View;

const HEADERS: [&str; 7] = [
    "Timestamp",
    "Location",
    "Pressure (kPa)",
    "Temperature (°C)",
    "Hourly flow (m³)",
    "Score",
    "Anomaly",
];

// ---------------------------------------------------------------------------
// Summary table (bottom panel)
// ---------------------------------------------------------------------------

/// Render the bounded row set: anomalies first, then recent normals.
pub fn record_table(ui: &mut Ui, view: &View) {
    let row_height = egui::TextStyle::Body
        .resolve(ui.style())
        .size
        .max(ui.spacing().interact_size.y);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(150.0))
        .columns(Column::auto().at_least(70.0), 5)
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(row_height, view.rows.len(), |mut row| {
                let record = &view.rows[row.index()];
                let anomaly = record.is_anomaly();
                row.set_selected(anomaly);

                let cell = |ui: &mut Ui, text: String| {
                    let text = RichText::new(text);
                    ui.label(if anomaly { text.color(Color32::RED) } else { text });
                };

                row.col(|ui| cell(ui, record.time_label()));
                row.col(|ui| cell(ui, record.location.clone()));
                row.col(|ui| cell(ui, format!("{:.2}", record.pressure_kpa)));
                row.col(|ui| cell(ui, format!("{:.2}", record.temperature_c)));
                row.col(|ui| cell(ui, format!("{:.2}", record.hourly_flow_m3)));
                row.col(|ui| {
                    cell(
                        ui,
                        record
                            .anomaly_score
                            .map(|s| format!("{s:.3}"))
                            .unwrap_or_default(),
                    )
                });
                row.col(|ui| cell(ui, (if anomaly { "YES" } else { "" }).to_string()));
            });
        });
}
