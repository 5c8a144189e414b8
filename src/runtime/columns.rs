//! Column type resolution
//!
//! Maps runtime column names and sensor type tags to decoding rules.
//! Unknown names are expected (the vendor adds columns over time) and
//! pass through as text.

use super::types::FieldValue;

/// Decoding rule for one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Base-10 integer, raw text on failure
    Integer,
    /// Float, raw text on failure
    Float,
    /// `"0"` is false, anything else is true
    Boolean,
    /// Raw text
    Text,
}

impl ColumnKind {
    /// Resolve a thermostat report column (case-insensitive)
    pub fn for_column(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "auxheat1" | "auxheat2" | "auxheat3" | "compcool1" | "compcool2" | "compheat1"
            | "compheat2" | "dehumidifier" | "economizer" | "fan" | "humidifier"
            | "outdoorhumidity" | "ventilator" | "wind" | "zonehumidity" | "zonehumidityhigh"
            | "zonehumiditylow" | "zone" => Self::Integer,
            "dmoffset" | "outdoortemp" | "zoneavetemp" | "zonecooltemp" | "zoneheattemp" => {
                Self::Float
            }
            "zoneoccupancy" => Self::Boolean,
            _ => Self::Text,
        }
    }

    /// Resolve a sensor type tag (exact match)
    pub fn for_sensor_type(tag: &str) -> Self {
        match tag {
            "co2" | "ctclamp" | "humidity" | "plug" | "pulsedElectricityMeter" => Self::Integer,
            "temperature" => Self::Float,
            "occupancy" | "dryContact" => Self::Boolean,
            _ => Self::Text,
        }
    }

    /// Decode a raw field. Never fails.
    pub fn decode(self, raw: &str) -> FieldValue {
        match self {
            Self::Integer => raw
                .parse::<i64>()
                .map_or_else(|_| FieldValue::Text(raw.to_string()), FieldValue::Integer),
            // NaN and infinities have no JSON form
            Self::Float => match raw.parse::<f64>() {
                Ok(n) if n.is_finite() => FieldValue::Float(n),
                _ => FieldValue::Text(raw.to_string()),
            },
            Self::Boolean => FieldValue::Boolean(raw != "0"),
            Self::Text => FieldValue::Text(raw.to_string()),
        }
    }
}
