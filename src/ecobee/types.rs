//! ecobee request and response bodies

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Columns requested from the runtime report, in request order
pub const RUNTIME_COLUMNS: [&str; 28] = [
    "auxHeat1",
    "auxHeat2",
    "auxHeat3",
    "compCool1",
    "compCool2",
    "compHeat1",
    "compHeat2",
    "dehumidifier",
    "dmOffset",
    "economizer",
    "fan",
    "humidifier",
    "hvacMode",
    "outdoorHumidity",
    "outdoorTemp",
    "sky",
    "ventilator",
    "wind",
    "zoneAveTemp",
    "zoneCalendarEvent",
    "zoneClimate",
    "zoneCoolTemp",
    "zoneHeatTemp",
    "zoneHumidity",
    "zoneHumidityHigh",
    "zoneHumidityLow",
    "zoneHvacMode",
    "zoneOccupancy",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which thermostats a request applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub selection_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_match: Option<String>,
}

impl Selection {
    /// Every thermostat registered to the account
    pub fn registered() -> Self {
        Self {
            selection_type: "registered".to_string(),
            selection_match: None,
        }
    }

    /// An explicit list of thermostat identifiers
    pub fn thermostats<S: AsRef<str>>(ids: &[S]) -> Self {
        let ids: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
        Self {
            selection_type: "thermostats".to_string(),
            selection_match: Some(ids.join(",")),
        }
    }
}

/// Body of the `json` parameter for `GET /1/thermostat`
#[derive(Debug, Clone, Serialize)]
pub struct ThermostatRequest {
    pub selection: Selection,
}

/// Thermostat summary as returned by `GET /1/thermostat`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Thermostat {
    pub identifier: String,
    pub name: String,
    pub thermostat_rev: String,
    pub is_registered: bool,
    pub model_number: String,
    pub brand: String,
    pub features: String,
    pub last_modified: String,
    pub thermostat_time: String,
    pub utc_time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ThermostatResponse {
    pub thermostat_list: Vec<Thermostat>,
}

/// Body of the `body` parameter for `GET /1/runtimeReport`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeReportRequest {
    pub start_date: String,
    pub end_date: String,
    pub columns: String,
    pub include_sensors: bool,
    pub selection: Selection,
}

impl RuntimeReportRequest {
    /// Request every runtime column and sensor reading for the inclusive
    /// date range
    pub fn new<S: AsRef<str>>(start: NaiveDate, end: NaiveDate, thermostats: &[S]) -> Self {
        Self {
            start_date: start.format(DATE_FORMAT).to_string(),
            end_date: end.format(DATE_FORMAT).to_string(),
            columns: RUNTIME_COLUMNS.join(","),
            include_sensors: true,
            selection: Selection::thermostats(thermostats),
        }
    }
}
