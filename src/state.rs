use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::data::loader::{load_file, LoadError};
use crate::data::locations::location_index;
use crate::data::model::RecordSet;
use crate::data::view::{build_view, Selection, View};

/// Data source loaded at startup, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "anomaly_results.json";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A load running on a worker thread.
struct PendingLoad {
    path: PathBuf,
    rx: Receiver<Result<RecordSet, LoadError>>,
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded record set (None until a load succeeds).
    pub record_set: Option<RecordSet>,

    /// Distinct locations of `record_set`, for the selection control.
    pub locations: Vec<String>,

    /// Current location selection.
    pub selection: Selection,

    /// View for `selection`, rebuilt on every selection change.
    pub view: View,

    /// Set whenever `view` is replaced; the chart clears it once it has
    /// discarded its previous zoom/pan.
    pub view_changed: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// At most one load in flight.
    pending: Option<PendingLoad>,
}

impl AppState {
    /// Whether a load is outstanding.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Start loading `path` on a worker thread.
    ///
    /// Refused (returns `false`) while another load is outstanding.
    pub fn begin_load(&mut self, path: PathBuf) -> bool {
        if let Some(pending) = &self.pending {
            log::warn!(
                "Ignoring load of {}: {} is still loading",
                path.display(),
                pending.path.display()
            );
            return false;
        }

        log::info!("Loading records from {}", path.display());
        let (tx, rx) = mpsc::channel();
        let worker_path = path.clone();
        std::thread::spawn(move || {
            // The receiver is gone only if the app has shut down.
            let _ = tx.send(load_file(&worker_path));
        });

        self.pending = Some(PendingLoad { path, rx });
        self.status_message = None;
        true
    }

    /// Check the outstanding load, applying its result if it has finished.
    /// Returns `true` when a load completed (successfully or not) this call.
    pub fn poll_load(&mut self) -> bool {
        let Some(pending) = &self.pending else {
            return false;
        };

        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(LoadError::Io {
                path: pending.path.clone(),
                source: std::io::Error::other("loader thread exited without a result"),
            }),
        };

        let path = pending.path.clone();
        self.pending = None;
        match result {
            Ok(set) => {
                log::info!(
                    "Loaded {} records ({} anomalies) from {}",
                    set.len(),
                    set.anomaly_count(),
                    path.display()
                );
                self.set_record_set(set);
            }
            Err(e) => self.fail_load(&path, &e),
        }
        true
    }

    /// Ingest a newly loaded record set: rebuild locations, reset to "all".
    pub fn set_record_set(&mut self, set: RecordSet) {
        self.locations = location_index(&set);
        log::info!("{} locations: {:?}", self.locations.len(), self.locations);
        self.record_set = Some(set);
        self.status_message = None;
        self.select(Selection::All);
    }

    /// Report a failed load. Any previously loaded data stays as it was.
    pub fn fail_load(&mut self, path: &Path, err: &LoadError) {
        log::error!("Failed to load {}: {err}", path.display());
        self.status_message = Some(format!("Error loading {}: {err}", path.display()));
    }

    /// Switch the location filter and rebuild the view from the full set.
    pub fn select(&mut self, selection: Selection) {
        let Some(set) = &self.record_set else {
            return;
        };
        self.view = build_view(set, &selection);
        log::debug!(
            "View for '{selection}': {} points, {} anomalies, {} rows",
            self.view.pressures.len(),
            self.view.anomaly_count(),
            self.view.rows.len()
        );
        self.selection = selection;
        self.view_changed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_json_str;
    use std::time::{Duration, Instant};

    const RECORDS: &str = r#"[
        {"timestamp": "2024-01-01T10:00:00", "location": "B", "pressure_kpa": 101,
         "temperature_c": 10, "hourly_flow_m3": 5, "anomaly_label": 0},
        {"timestamp": "2024-01-01T09:00:00", "location": "A", "pressure_kpa": 90,
         "temperature_c": 10, "hourly_flow_m3": 5, "anomaly_label": 1},
        {"timestamp": "2024-01-01T11:00:00", "location": "A", "pressure_kpa": 100,
         "temperature_c": 10, "hourly_flow_m3": 5, "anomaly_label": 0}
    ]"#;

    fn wait_for_load(state: &mut AppState) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !state.poll_load() {
            assert!(Instant::now() < deadline, "load did not finish");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_set_record_set_resets_to_all() {
        let mut state = AppState::default();
        state.set_record_set(load_json_str(RECORDS).unwrap());

        assert_eq!(state.locations, vec!["A", "B"]);
        assert_eq!(state.selection, Selection::All);
        assert_eq!(state.view.pressures, vec![90.0, 101.0, 100.0]);
        assert!(state.view_changed);
    }

    #[test]
    fn test_select_rebuilds_from_full_set() {
        let mut state = AppState::default();
        state.set_record_set(load_json_str(RECORDS).unwrap());

        state.select(Selection::from_control("B"));
        assert_eq!(state.view.records.len(), 1);

        state.select(Selection::from_control("A"));
        assert_eq!(state.view.pressures, vec![90.0, 100.0]);
        assert_eq!(state.view.overlay.len(), 1);
    }

    #[test]
    fn test_failed_first_load_builds_nothing() {
        let mut state = AppState::default();
        assert!(state.begin_load(PathBuf::from("definitely/missing/records.json")));
        wait_for_load(&mut state);

        assert!(!state.is_loading());
        assert!(state.record_set.is_none());
        assert!(state.locations.is_empty());
        assert!(state.view.is_empty());
        assert!(!state.view_changed);
        assert!(state.status_message.is_some());
    }

    #[test]
    fn test_failed_reload_keeps_previous_data() {
        let mut state = AppState::default();
        state.set_record_set(load_json_str(RECORDS).unwrap());
        state.select(Selection::from_control("A"));

        state.begin_load(PathBuf::from("definitely/missing/records.csv"));
        wait_for_load(&mut state);

        assert_eq!(state.selection, Selection::from_control("A"));
        assert_eq!(state.view.records.len(), 2);
        assert!(state.status_message.is_some());
    }

    #[test]
    fn test_second_load_refused_while_pending() {
        let mut state = AppState::default();
        assert!(state.begin_load(PathBuf::from("missing-one.json")));
        assert!(!state.begin_load(PathBuf::from("missing-two.json")));
        assert!(state.is_loading());
        wait_for_load(&mut state);
        assert!(!state.is_loading());
    }
}
