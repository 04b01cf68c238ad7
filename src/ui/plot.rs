use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Pressure chart (central panel)
// ---------------------------------------------------------------------------

/// Time label for the series index nearest to `x`, empty off the series.
fn label_at(labels: &[String], x: f64) -> String {
    let i = x.round();
    if i < 0.0 || (i - x).abs() > 1e-6 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

/// Render pressure over time with anomalies overlaid as points.
///
/// When the view has been replaced since the last frame, the plot's stored
/// zoom/pan is discarded before drawing.
pub fn pressure_plot(ui: &mut Ui, state: &mut AppState) {
    if state.record_set.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view readings  (File → Open…)");
        });
        return;
    }

    let reset = std::mem::take(&mut state.view_changed);
    let view = &state.view;

    if view.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(format!("No readings for '{}'", view.selection));
        });
        return;
    }

    let axis_labels = view.labels.clone();
    let hover_labels = view.labels.clone();

    let mut plot = Plot::new("pressure_plot")
        .legend(Legend::default())
        .x_axis_label("Time")
        .y_axis_label("Pressure (kPa)")
        .x_axis_formatter(move |mark, _range| label_at(&axis_labels, mark.value))
        .label_formatter(move |name, value| {
            let time = label_at(&hover_labels, value.x.round());
            if name.is_empty() {
                format!("{time}\n{:.2} kPa", value.y)
            } else {
                format!("{name}\n{time}\n{:.2} kPa", value.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if reset {
        plot = plot.reset();
    }

    plot.show(ui, |plot_ui| {
        let series: PlotPoints = view
            .pressures
            .iter()
            .enumerate()
            .map(|(i, &p)| [i as f64, p])
            .collect();
        plot_ui.line(
            Line::new(series)
                .name("Pressure (kPa)")
                .color(Color32::LIGHT_BLUE)
                .width(1.5),
        );

        let anomalies: PlotPoints = view
            .overlay
            .iter()
            .map(|p| [p.index as f64, p.pressure_kpa])
            .collect();
        plot_ui.points(
            Points::new(anomalies)
                .name("Anomalies (pressure)")
                .color(Color32::RED)
                .radius(5.0),
        );
    });
}
