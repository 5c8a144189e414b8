//! Runtime report transformation
//!
//! Turns the vendor's column-oriented runtime report into typed records.
//!
//! # Overview
//!
//! - `ColumnKind` - decoding rule per column name or sensor type
//! - `ColumnSpec` - resolved thermostat column layout, decodes report rows
//! - `SensorMatcher` - joins sensor data columns to declared sensors
//! - `parse_runtime` - decodes a full response into two record sequences
//!
//! Everything here is synchronous and stateless; lookups are rebuilt for
//! every response.

mod columns;
mod parser;
mod row;
mod sensors;
mod types;

pub use columns::ColumnKind;
pub use parser::{parse_runtime, transform};
pub use row::{Column, ColumnSpec, RawRow, RowError};
pub use sensors::{MatchedRow, SensorMatcher};
pub use types::{
    FieldValue, ParseStats, Record, RecordKind, ReportGroup, RuntimeData, RuntimeResponse,
    Sensor, SensorGroup,
};
