use std::fmt;

use super::model::{Record, RecordSet};

/// Reserved selection string meaning "no location filter".
pub const ALL_LOCATIONS: &str = "all";

/// Maximum number of normal records shown in the table, most recent first kept.
pub const NORMAL_ROW_LIMIT: usize = 50;

// ---------------------------------------------------------------------------
// Selection – what the location control emits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Location(String),
}

impl Selection {
    /// Map a selection-control value to a [`Selection`]; `"all"` is reserved.
    pub fn from_control(value: &str) -> Self {
        if value == ALL_LOCATIONS {
            Selection::All
        } else {
            Selection::Location(value.to_string())
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Selection::All => true,
            Selection::Location(loc) => record.location == *loc,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "{ALL_LOCATIONS}"),
            Selection::Location(loc) => write!(f, "{loc}"),
        }
    }
}

// ---------------------------------------------------------------------------
// View – one render pass worth of derived data
// ---------------------------------------------------------------------------

/// An anomalous point of the main series, keyed by its series index.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPoint {
    pub index: usize,
    pub label: String,
    pub pressure_kpa: f64,
}

/// Read-only projection of a record set for one selection.
///
/// `records`, `labels` and `pressures` are index-aligned. `overlay` holds only
/// the anomalous positions, in series order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    pub selection: Selection,
    pub records: Vec<Record>,
    pub labels: Vec<String>,
    pub pressures: Vec<f64>,
    pub overlay: Vec<OverlayPoint>,
    /// All anomalies, then the last [`NORMAL_ROW_LIMIT`] normals.
    pub rows: Vec<Record>,
}

impl View {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn anomaly_count(&self) -> usize {
        self.overlay.len()
    }

    pub fn normal_count(&self) -> usize {
        self.records.len() - self.overlay.len()
    }

    /// Overlay expanded to series length, `None` at non-anomalous positions.
    pub fn sparse_overlay(&self) -> Vec<Option<f64>> {
        let mut sparse = vec![None; self.pressures.len()];
        for point in &self.overlay {
            sparse[point.index] = Some(point.pressure_kpa);
        }
        sparse
    }
}

/// Build the view for `selection` from the full record set.
///
/// Never fails: an empty record set or an unknown location yields an empty view.
pub fn build_view(set: &RecordSet, selection: &Selection) -> View {
    let mut records: Vec<Record> = set
        .records()
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect();

    // `sort_by_key` is stable: equal timestamps keep source order.
    records.sort_by_key(|r| r.timestamp);

    let labels: Vec<String> = records.iter().map(Record::time_label).collect();
    let pressures: Vec<f64> = records.iter().map(|r| r.pressure_kpa).collect();

    let overlay = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_anomaly())
        .map(|(index, r)| OverlayPoint {
            index,
            label: labels[index].clone(),
            pressure_kpa: r.pressure_kpa,
        })
        .collect();

    let rows = display_rows(&records);

    View {
        selection: selection.clone(),
        records,
        labels,
        pressures,
        overlay,
        rows,
    }
}

fn display_rows(sorted: &[Record]) -> Vec<Record> {
    let (anomalies, normals): (Vec<&Record>, Vec<&Record>) =
        sorted.iter().partition(|r| r.is_anomaly());
    let skip = normals.len().saturating_sub(NORMAL_ROW_LIMIT);

    anomalies
        .into_iter()
        .chain(normals.into_iter().skip(skip))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::AnomalyLabel;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn record(ts: NaiveDateTime, location: &str, anomaly: bool, pressure: f64) -> Record {
        Record {
            timestamp: ts,
            location: location.to_string(),
            pressure_kpa: pressure,
            temperature_c: 15.0,
            hourly_flow_m3: 30.0,
            anomaly_label: if anomaly {
                AnomalyLabel::Anomaly
            } else {
                AnomalyLabel::Normal
            },
            anomaly_score: None,
        }
    }

    fn mixed_set() -> RecordSet {
        RecordSet::new(vec![
            record(at(10, 0), "A", false, 101.0),
            record(at(9, 0), "A", true, 95.0),
            record(at(11, 0), "B", false, 102.0),
        ])
    }

    #[test]
    fn test_all_selection_sorts_and_overlays() {
        let view = build_view(&mixed_set(), &Selection::All);

        assert_eq!(
            view.labels,
            vec![
                "2024-06-01 09:00:00",
                "2024-06-01 10:00:00",
                "2024-06-01 11:00:00"
            ]
        );
        assert_eq!(view.pressures, vec![95.0, 101.0, 102.0]);
        assert_eq!(view.overlay.len(), 1);
        assert_eq!(view.overlay[0].index, 0);
        assert_eq!(view.overlay[0].label, view.labels[0]);
        assert_eq!(view.sparse_overlay(), vec![Some(95.0), None, None]);
    }

    #[test]
    fn test_location_filter_keeps_only_matching_rows() {
        let view = build_view(&mixed_set(), &Selection::from_control("A"));
        assert_eq!(view.records.len(), 2);
        assert!(view.rows.iter().all(|r| r.location == "A"));
        assert!(view.overlay.len() <= view.pressures.len());
        // anomaly first, then the normal
        assert!(view.rows[0].is_anomaly());
        assert!(!view.rows[1].is_anomaly());
    }

    #[test]
    fn test_unknown_location_yields_empty_view() {
        let view = build_view(&mixed_set(), &Selection::from_control("Z"));
        assert!(view.is_empty());
        assert!(view.labels.is_empty());
        assert!(view.pressures.is_empty());
        assert!(view.overlay.is_empty());
        assert!(view.rows.is_empty());
    }

    #[test]
    fn test_empty_record_set_yields_empty_view() {
        let view = build_view(&RecordSet::default(), &Selection::All);
        assert!(view.is_empty());
        assert!(view.rows.is_empty());
    }

    #[test]
    fn test_equal_timestamps_keep_source_order() {
        let set = RecordSet::new(vec![
            record(at(12, 0), "A", false, 1.0),
            record(at(8, 0), "B", false, 2.0),
            record(at(12, 0), "C", true, 3.0),
            record(at(12, 0), "B", false, 4.0),
        ]);
        let view = build_view(&set, &Selection::All);
        assert_eq!(view.pressures, vec![2.0, 1.0, 3.0, 4.0]);
        assert_eq!(view.overlay[0].index, 2);
    }

    #[test]
    fn test_rows_keep_fifty_most_recent_normals() {
        // 60 normals in reverse chronological order
        let set = RecordSet::new(
            (0..60)
                .rev()
                .map(|i| record(at(i / 60, i % 60), "A", false, i as f64))
                .collect(),
        );
        let view = build_view(&set, &Selection::Location("A".to_string()));

        assert_eq!(view.rows.len(), NORMAL_ROW_LIMIT);
        let pressures: Vec<f64> = view.rows.iter().map(|r| r.pressure_kpa).collect();
        let expected: Vec<f64> = (10..60).map(|i| i as f64).collect();
        assert_eq!(pressures, expected);
    }

    #[test]
    fn test_row_count_is_anomalies_plus_bounded_normals() {
        for (k, m) in [(0, 0), (3, 10), (5, 50), (7, 80)] {
            let mut records = Vec::new();
            for i in 0..(k + m) {
                let minute = i as u32;
                records.push(record(at(minute / 60, minute % 60), "A", i < k, 100.0));
            }
            let view = build_view(&RecordSet::new(records), &Selection::All);
            assert_eq!(view.rows.len(), k + m.min(NORMAL_ROW_LIMIT));
            assert_eq!(view.anomaly_count(), k);
            assert_eq!(view.normal_count(), m);
            assert!(view.rows[..k].iter().all(Record::is_anomaly));
        }
    }

    #[test]
    fn test_rows_list_anomalies_in_time_order_before_recent_normals() {
        // Source order is newest first; anomalies at minutes 50, 20 and 5.
        let set = RecordSet::new(
            (0..70u32)
                .rev()
                .map(|m| record(at(m / 60, m % 60), "A", matches!(m, 5 | 20 | 50), m as f64))
                .collect(),
        );
        let view = build_view(&set, &Selection::All);

        assert_eq!(view.rows.len(), 3 + NORMAL_ROW_LIMIT);
        let (anomalies, normals) = view.rows.split_at(3);

        let anomaly_minutes: Vec<f64> = anomalies.iter().map(|r| r.pressure_kpa).collect();
        assert_eq!(anomaly_minutes, vec![5.0, 20.0, 50.0]);
        assert!(anomalies.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

        // 67 normals; the last 50 are minutes 18..70 minus the anomalies.
        let expected: Vec<f64> = (18..70u32)
            .filter(|&m| !matches!(m, 20 | 50))
            .map(|m| m as f64)
            .collect();
        let normal_minutes: Vec<f64> = normals.iter().map(|r| r.pressure_kpa).collect();
        assert_eq!(normal_minutes, expected);
        assert!(normals.iter().all(|r| !r.is_anomaly()));
    }

    #[test]
    fn test_build_view_is_idempotent() {
        let set = mixed_set();
        let selection = Selection::from_control("all");
        assert_eq!(build_view(&set, &selection), build_view(&set, &selection));
    }

    #[test]
    fn test_selection_round_trips_through_control_string() {
        assert_eq!(Selection::from_control("all"), Selection::All);
        assert_eq!(Selection::All.to_string(), "all");
        assert_eq!(Selection::from_control("North").to_string(), "North");
    }
}
