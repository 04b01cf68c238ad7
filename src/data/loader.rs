use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{AnomalyLabel, Record, RecordSet};

/// Date-time layouts accepted when the timestamp carries no UTC offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to produce a [`RecordSet`]. Fatal to the render that requested it.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("parsing CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("expected a top-level JSON array of records")]
    NotAnArray,
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),
}

/// A single bad record. Rejects the whole record set.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("record {index}: {kind}")]
pub struct MalformedRecordError {
    pub index: usize,
    pub kind: MalformedKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedKind {
    #[error("not a JSON object")]
    NotAnObject,
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("location must be a string or number, got '{0}'")]
    InvalidLocation(String),
    #[error("unparseable timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("field '{field}' is not a number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("anomaly_label must be 0 or 1, got '{0}'")]
    InvalidLabel(String),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a record set from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `[{ "timestamp": ..., "location": ..., "pressure_kpa": ..., ... }, ...]`
/// * `.csv`  – header row naming the same fields; extra columns are ignored
pub fn load_file(path: &Path) -> Result<RecordSet, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    match ext.as_str() {
        "json" => {
            let text = std::fs::read_to_string(path).map_err(io_err)?;
            load_json_str(&text)
        }
        "csv" => {
            let file = std::fs::File::open(path).map_err(io_err)?;
            load_csv_reader(file)
        }
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a records-oriented JSON array (`df.to_json(orient='records')`).
pub fn load_json_str(text: &str) -> Result<RecordSet, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root.as_array().ok_or(LoadError::NotAnArray)?;

    let records = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let obj = row.as_object().ok_or(MalformedRecordError {
                index,
                kind: MalformedKind::NotAnObject,
            })?;
            parse_record(index, |name| {
                obj.get(name)
                    .filter(|v| !v.is_null())
                    .map(RawValue::Json)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RecordSet::new(records))
}

/// Parse CSV with a header row, as written by the detector's `to_csv`.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<RecordSet, LoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        let record = parse_record(index, |name| {
            let cell = match name {
                "timestamp" => &row.timestamp,
                "location" => &row.location,
                "pressure_kpa" => &row.pressure_kpa,
                "temperature_c" => &row.temperature_c,
                "hourly_flow_m3" => &row.hourly_flow_m3,
                "anomaly_label" => &row.anomaly_label,
                "anomaly_score" => &row.anomaly_score,
                _ => return None,
            };
            cell.as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(RawValue::Text)
        })?;
        records.push(record);
    }

    Ok(RecordSet::new(records))
}

// ---------------------------------------------------------------------------
// Field normalisation
// ---------------------------------------------------------------------------

/// The columns we read from a CSV row; anything else is skipped.
#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: Option<String>,
    location: Option<String>,
    pressure_kpa: Option<String>,
    temperature_c: Option<String>,
    hourly_flow_m3: Option<String>,
    anomaly_label: Option<String>,
    anomaly_score: Option<String>,
}

/// A raw cell, either a JSON value or CSV text.
#[derive(Debug, Clone, Copy)]
enum RawValue<'a> {
    Json(&'a JsonValue),
    Text(&'a str),
}

impl RawValue<'_> {
    fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Json(JsonValue::String(s)) => Some(s.as_str()),
            RawValue::Text(s) => Some(*s),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            RawValue::Json(JsonValue::String(s)) => s.clone(),
            RawValue::Json(v) => v.to_string(),
            RawValue::Text(s) => s.to_string(),
        }
    }
}

fn parse_record<'a, F>(index: usize, field: F) -> Result<Record, MalformedRecordError>
where
    F: Fn(&'static str) -> Option<RawValue<'a>>,
{
    let malformed = |kind| MalformedRecordError { index, kind };
    let required =
        |name: &'static str| field(name).ok_or(malformed(MalformedKind::MissingField(name)));
    let number = |name: &'static str, raw: RawValue<'a>| {
        parse_number(raw).ok_or_else(|| {
            malformed(MalformedKind::InvalidNumber {
                field: name,
                value: raw.describe(),
            })
        })
    };

    let raw_ts = required("timestamp")?;
    let timestamp = parse_timestamp(raw_ts)
        .ok_or_else(|| malformed(MalformedKind::InvalidTimestamp(raw_ts.describe())))?;

    let location = match required("location")? {
        RawValue::Json(JsonValue::Number(n)) => n.to_string(),
        raw => raw
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| malformed(MalformedKind::InvalidLocation(raw.describe())))?,
    };

    let pressure_kpa = number("pressure_kpa", required("pressure_kpa")?)?;
    let temperature_c = number("temperature_c", required("temperature_c")?)?;
    let hourly_flow_m3 = number("hourly_flow_m3", required("hourly_flow_m3")?)?;

    let raw_label = required("anomaly_label")?;
    let anomaly_label = parse_label(raw_label)
        .ok_or_else(|| malformed(MalformedKind::InvalidLabel(raw_label.describe())))?;

    let anomaly_score = field("anomaly_score")
        .map(|raw| number("anomaly_score", raw))
        .transpose()?;

    Ok(Record {
        timestamp,
        location,
        pressure_kpa,
        temperature_c,
        hourly_flow_m3,
        anomaly_label,
        anomaly_score,
    })
}

/// Integers are epoch milliseconds (pandas' default JSON date encoding).
fn parse_timestamp(raw: RawValue<'_>) -> Option<NaiveDateTime> {
    if let RawValue::Json(JsonValue::Number(n)) = raw {
        return DateTime::from_timestamp_millis(n.as_i64()?).map(|dt| dt.naive_utc());
    }
    parse_timestamp_str(raw.as_str()?)
}

fn parse_timestamp_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()?
                .and_hms_opt(0, 0, 0)
        })
}

/// Numbers pass through; strings are stripped of anything that cannot be
/// part of a float (units, thousands separators) before parsing.
fn parse_number(raw: RawValue<'_>) -> Option<f64> {
    let value = match raw {
        RawValue::Json(JsonValue::Number(n)) => n.as_f64()?,
        other => {
            let cleaned: String = other
                .as_str()?
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
                .collect();
            cleaned.parse::<f64>().ok()?
        }
    };
    value.is_finite().then_some(value)
}

fn parse_label(raw: RawValue<'_>) -> Option<AnomalyLabel> {
    let value = match raw {
        RawValue::Json(JsonValue::Bool(true)) => return Some(AnomalyLabel::Anomaly),
        RawValue::Json(JsonValue::Bool(false)) => return Some(AnomalyLabel::Normal),
        RawValue::Json(JsonValue::Number(n)) => n.as_f64()?,
        other => other.as_str()?.trim().parse::<f64>().ok()?,
    };
    if value == 0.0 {
        Some(AnomalyLabel::Normal)
    } else if value == 1.0 {
        Some(AnomalyLabel::Anomaly)
    } else {
        None
    }
}
