//! Runtime report types
//!
//! The vendor response shape (deserialized once per request) and the
//! normalized records produced from it.

use crate::ecobee::ApiStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

// ============================================================================
// Vendor response
// ============================================================================

/// Raw runtime report response
///
/// Column layouts and sensor sets are discovered per response; nothing here is
/// fixed at compile time beyond the envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeResponse {
    /// Comma-joined column names shared by every report row
    #[serde(default)]
    pub columns: String,
    /// One entry per thermostat
    #[serde(default)]
    pub report_list: Vec<ReportGroup>,
    /// One entry per thermostat that has sensor data
    #[serde(default)]
    pub sensor_list: Vec<SensorGroup>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub start_interval: Option<i64>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub end_interval: Option<i64>,
    /// Request status, checked by the API client before parsing
    #[serde(default)]
    pub status: Option<ApiStatus>,
}

/// One thermostat's runtime rows
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportGroup {
    #[serde(rename = "thermostatIdentifier", default)]
    pub thermostat_id: String,
    #[serde(rename = "rowCount", default)]
    pub row_count: usize,
    #[serde(rename = "rowList", default)]
    pub rows: Vec<String>,
}

/// One thermostat's sensor rows, with its own column layout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorGroup {
    #[serde(rename = "thermostatIdentifier", default)]
    pub thermostat_id: String,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
    /// Column headers, starting with `date` and `time`
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<String>,
}

/// Declared sensor metadata
///
/// Reads the vendor's `sensorId`/`sensorName`/... keys and writes the short
/// `id`/`name`/`type`/`usage` keys used in the nested record object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sensor {
    #[serde(rename(deserialize = "sensorId", serialize = "id"))]
    pub id: String,
    #[serde(rename(deserialize = "sensorName", serialize = "name"), default)]
    pub name: String,
    #[serde(rename(deserialize = "sensorType", serialize = "type"), default)]
    pub sensor_type: String,
    #[serde(rename(deserialize = "sensorUsage", serialize = "usage"), default)]
    pub usage: String,
}

impl Sensor {
    /// Create sensor metadata
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        sensor_type: impl Into<String>,
        usage: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sensor_type: sensor_type.into(),
            usage: usage.into(),
        }
    }
}

// ============================================================================
// Normalized output
// ============================================================================

/// A decoded field value
///
/// Numeric columns that fail to parse keep their raw text, so a field is only
/// guaranteed to be present, not to have its nominal type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Record discriminator, serialized as the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Thermostat,
    Sensor,
}

/// Keys written by [`Record`] itself
pub const RESERVED_KEYS: [&str; 5] = ["@timestamp", "date", "time", "type", "sensor"];

/// One normalized event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// `date` + "T" + `time`, never validated
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor: Option<Sensor>,
    #[serde(flatten)]
    pub values: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Create a record with no values yet
    pub fn new(kind: RecordKind, date: impl Into<String>, time: impl Into<String>) -> Self {
        let date = date.into();
        let time = time.into();
        Self {
            timestamp: format!("{date}T{time}"),
            date,
            time,
            kind,
            sensor: None,
            values: BTreeMap::new(),
        }
    }

    /// Attach sensor metadata
    #[must_use]
    pub fn with_sensor(mut self, sensor: Sensor) -> Self {
        self.sensor = Some(sensor);
        self
    }

    /// Set a value. Keys naming a fixed field are dropped so the
    /// serialized object never repeats a key. Returns whether it was kept.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) -> bool {
        let key = key.into();
        if RESERVED_KEYS.contains(&key.as_str()) {
            debug!(key, "Dropping value that collides with a record field");
            return false;
        }
        self.values.insert(key, value);
        true
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }
}

/// Output of one parsed response
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuntimeData {
    /// Thermostat records, in report order
    pub data: Vec<Record>,
    /// Sensor records, in report order
    pub sensor_data: Vec<Record>,
    #[serde(skip)]
    pub stats: ParseStats,
}

impl RuntimeData {
    /// Total number of records across both sequences
    pub fn len(&self) -> usize {
        self.data.len() + self.sensor_data.len()
    }

    /// Whether both sequences are empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.sensor_data.is_empty()
    }

    /// Iterate thermostat records, then sensor records
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.data.iter().chain(self.sensor_data.iter())
    }
}

/// Counters collected while parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Report rows decoded into thermostat records
    pub rows_decoded: usize,
    /// Sensor rows processed
    pub sensor_rows: usize,
    /// Sensor records emitted
    pub readings: usize,
    /// Rows skipped because they were malformed
    pub rows_skipped: usize,
    /// Sensor fields with no declared sensor
    pub unmatched_columns: usize,
}
