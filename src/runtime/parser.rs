//! Runtime report parser
//!
//! Drives the row decoder and sensor matcher across every report group.
//! Output order follows input order; nothing is sorted or deduplicated.

use super::row::ColumnSpec;
use super::sensors::SensorMatcher;
use super::types::{RuntimeData, RuntimeResponse};
use crate::error::{Error, Result};
use tracing::{debug, warn};

/// Parse a raw runtime report body
///
/// A body that does not match the response shape is fatal for the batch.
/// Malformed rows are skipped and counted in [`RuntimeData::stats`].
pub fn parse_runtime(body: &[u8]) -> Result<RuntimeData> {
    let response: RuntimeResponse = serde_json::from_slice(body)
        .map_err(|e| Error::decode(format!("Invalid runtime report: {e}")))?;
    Ok(transform(&response))
}

/// Convert a decoded response into thermostat and sensor records
pub fn transform(response: &RuntimeResponse) -> RuntimeData {
    let spec = ColumnSpec::parse(&response.columns);

    let row_total: usize = response.report_list.iter().map(|g| g.rows.len()).sum();
    let mut out = RuntimeData {
        data: Vec::with_capacity(row_total),
        ..RuntimeData::default()
    };

    for group in &response.report_list {
        if group.row_count != group.rows.len() {
            debug!(
                thermostat = %group.thermostat_id,
                row_count = group.row_count,
                rows = group.rows.len(),
                "Row count does not match row list"
            );
        }

        for (line, raw) in group.rows.iter().enumerate() {
            match spec.decode_row(raw) {
                Ok(record) => {
                    out.data.push(record);
                    out.stats.rows_decoded += 1;
                }
                Err(e) => {
                    warn!(thermostat = %group.thermostat_id, line, "Skipping report row: {e}");
                    out.stats.rows_skipped += 1;
                }
            }
        }
    }

    for group in &response.sensor_list {
        let matcher = SensorMatcher::for_group(group);

        for (line, raw) in group.data.iter().enumerate() {
            match matcher.match_row(raw) {
                Ok(matched) => {
                    out.stats.sensor_rows += 1;
                    out.stats.readings += matched.records.len();
                    out.stats.unmatched_columns += matched.unmatched;
                    out.sensor_data.extend(matched.records);
                }
                Err(e) => {
                    warn!(thermostat = %group.thermostat_id, line, "Skipping sensor row: {e}");
                    out.stats.rows_skipped += 1;
                }
            }
        }
    }

    debug!(
        records = out.data.len(),
        sensor_records = out.sensor_data.len(),
        skipped = out.stats.rows_skipped,
        "Parsed runtime report"
    );

    out
}
