//! NDJSON bulk body builder
//!
//! Every document line is preceded by an `{"index":{}}` action line so the
//! body can be posted to `_bulk` unchanged. Thermostat records come first,
//! then sensor records.

use crate::error::Result;
use crate::runtime::{Record, RuntimeData};
use bytes::{BufMut, Bytes, BytesMut};
use std::io::Write;

/// Action line preceding every document
pub const INDEX_ACTION: &[u8] = b"{\"index\":{}}";

/// Serialize parsed runtime data into a bulk ingest body
pub fn to_bulk_ndjson(data: &RuntimeData) -> Result<Bytes> {
    records_to_ndjson(data.records())
}

/// Serialize records into a bulk ingest body, preserving iteration order
pub fn records_to_ndjson<'a>(records: impl IntoIterator<Item = &'a Record>) -> Result<Bytes> {
    let mut writer = BytesMut::new().writer();

    for record in records {
        writer.write_all(INDEX_ACTION)?;
        writer.write_all(b"\n")?;
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }

    Ok(writer.into_inner().freeze())
}
