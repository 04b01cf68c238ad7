use chrono::NaiveDateTime;

/// Display format for timestamps in chart labels and table cells.
pub const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// AnomalyLabel – the precomputed detector verdict
// ---------------------------------------------------------------------------

/// Binary anomaly flag, normalised from the loose `0` / `1` / `"1"` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyLabel {
    Normal,
    Anomaly,
}

impl AnomalyLabel {
    pub fn is_anomaly(self) -> bool {
        self == AnomalyLabel::Anomaly
    }
}

// ---------------------------------------------------------------------------
// Record – one sensor observation
// ---------------------------------------------------------------------------

/// A single sensor reading with its anomaly label.
///
/// `timestamp` is normalised to UTC at load time and never re-parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub timestamp: NaiveDateTime,
    pub location: String,
    pub pressure_kpa: f64,
    pub temperature_c: f64,
    pub hourly_flow_m3: f64,
    pub anomaly_label: AnomalyLabel,
    /// Detector score (higher is more anomalous), when the source carries one.
    pub anomaly_score: Option<f64>,
}

impl Record {
    pub fn is_anomaly(&self) -> bool {
        self.anomaly_label.is_anomaly()
    }

    /// Human-readable timestamp used for chart labels and table cells.
    pub fn time_label(&self) -> String {
        self.timestamp.format(LABEL_FORMAT).to_string()
    }
}

// ---------------------------------------------------------------------------
// RecordSet – the complete loaded dataset
// ---------------------------------------------------------------------------

/// All records in source order. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the record set is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn anomaly_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_anomaly()).count()
    }
}
