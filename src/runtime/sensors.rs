//! Sensor column matching
//!
//! Sensor rows carry one reading per column, and each column header is a
//! sensor id. Headers with no declared sensor are dropped.

use super::columns::ColumnKind;
use super::row::{RawRow, RowError};
use super::types::{Record, RecordKind, Sensor, SensorGroup};
use std::collections::HashMap;

/// Records produced from one sensor row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchedRow {
    pub records: Vec<Record>,
    /// Fields whose column has no declared sensor
    pub unmatched: usize,
}

/// Joins sensor data columns to declared sensor metadata for one group
#[derive(Debug, Clone, Default)]
pub struct SensorMatcher {
    sensors: HashMap<String, Sensor>,
    /// Column headers with `date` and `time` stripped
    columns: Vec<String>,
}

impl SensorMatcher {
    /// Build from a sensor list and the group's full column headers
    pub fn new(sensors: &[Sensor], columns: &[String]) -> Self {
        let sensors = sensors
            .iter()
            .map(|s| (s.id.clone(), s.clone()))
            .collect();
        let columns = columns.iter().skip(2).cloned().collect();
        Self { sensors, columns }
    }

    /// Build from a sensor group
    pub fn for_group(group: &SensorGroup) -> Self {
        Self::new(&group.sensors, &group.columns)
    }

    /// Sensor declared for a data column position, if any
    pub fn sensor_at(&self, index: usize) -> Option<&Sensor> {
        self.columns.get(index).and_then(|id| self.sensors.get(id))
    }

    /// Number of data columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Decode one sensor data row
    pub fn match_row(&self, raw: &str) -> Result<MatchedRow, RowError> {
        let row = RawRow::split(raw)?;
        let mut matched = MatchedRow::default();

        for (i, field) in row.fields.iter().enumerate() {
            let Some(sensor) = self.sensor_at(i) else {
                matched.unmatched += 1;
                continue;
            };

            let kind = ColumnKind::for_sensor_type(&sensor.sensor_type);
            let mut record =
                Record::new(RecordKind::Sensor, row.date, row.time).with_sensor(sensor.clone());
            record.insert(sensor.sensor_type.clone(), kind.decode(field));
            matched.records.push(record);
        }

        Ok(matched)
    }
}
