//! Output module
//!
//! Handles everything that happens to a transformed window.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Building the NDJSON bulk ingest body from parsed records
//! - Writing that body to a per-window archive file
//! - Sending it to Elasticsearch through the `IndexSink` trait

mod archive;
mod elastic;
mod ndjson;

pub use archive::ArchiveWriter;
pub use elastic::{BulkSummary, ElasticClient, IndexSink};
pub use ndjson::{records_to_ndjson, to_bulk_ndjson, INDEX_ACTION};
