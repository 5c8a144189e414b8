// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # elastibee
//!
//! Archives ecobee thermostat runtime telemetry into Elasticsearch.
//!
//! ## Features
//!
//! - **PIN Authorization**: ecobee PIN grant with persisted, auto-refreshed tokens
//! - **Runtime Reports**: Thermostat and remote sensor history in fixed date windows
//! - **Typed Records**: Column-oriented report rows decoded into typed events
//! - **Bulk Ingest**: NDJSON bodies sent to Elasticsearch and archived locally
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use elastibee::runtime::parse_runtime;
//! use elastibee::output::to_bulk_ndjson;
//!
//! let data = parse_runtime(&body)?;
//! println!("{} thermostat, {} sensor records", data.data.len(), data.sensor_data.len());
//! let ndjson = to_bulk_ndjson(&data)?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Archive Engine                          │
//! │   per window: fetch → transform → save → send → pause           │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   ecobee  │    Runtime    │ Partition │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ PIN      │ Status    │ Column types  │ Date      │ NDJSON      │
//! │ Token    │ Refresh   │ Row decoder   │ windows   │ Archive     │
//! │ Refresh  │ Reports   │ Sensor match  │           │ Elastic     │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Runtime report transformation
pub mod runtime;

/// ecobee PIN authorization
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// ecobee API client
pub mod ecobee;

/// Credential persistence
pub mod state;

/// Date window partitioning
pub mod partition;

/// NDJSON, archive files and Elasticsearch
pub mod output;

/// Archive loop
pub mod engine;

/// Settings
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use runtime::{parse_runtime, Record, RuntimeData};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
