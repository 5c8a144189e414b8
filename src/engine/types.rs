//! Engine types
//!
//! Stage labels, configuration and statistics for the archive loop.

use crate::output::BulkSummary;
use crate::partition::DateWindow;
use crate::runtime::ParseStats;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Step of one window, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Requesting the runtime report
    Fetching,
    /// Parsing the report and building the bulk body
    Transforming,
    /// Writing the archive file
    Saving,
    /// Posting the bulk body to the index
    Sending,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Transforming => "transforming",
            Self::Saving => "saving",
            Self::Sending => "sending",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for an archive run
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Index receiving the bulk bodies
    pub index: String,
    /// Mapping used if the index has to be created
    pub mapping: PathBuf,
    /// Pause between windows
    pub pause: Duration,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            index: "eco".to_string(),
            mapping: PathBuf::from("etc/mapping.json"),
            pause: Duration::from_secs(15),
        }
    }
}

impl ArchiveConfig {
    /// Create a new archive config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target index
    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    /// Set the mapping file
    #[must_use]
    pub fn with_mapping(mut self, mapping: impl Into<PathBuf>) -> Self {
        self.mapping = mapping.into();
        self
    }

    /// Set the pause between windows
    #[must_use]
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }
}

/// Result of archiving one window
#[derive(Debug, Clone)]
pub struct WindowReport {
    pub window: DateWindow,
    /// Thermostat records written
    pub thermostat_records: usize,
    /// Sensor records written
    pub sensor_records: usize,
    pub parse: ParseStats,
    /// Where the bulk body was archived
    pub archive_path: PathBuf,
    /// Size of the bulk body in bytes
    pub bytes: usize,
    pub bulk: BulkSummary,
}

impl WindowReport {
    /// Total records in the window
    pub fn records(&self) -> usize {
        self.thermostat_records + self.sensor_records
    }
}

/// Statistics from an archive run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    /// Windows fully processed
    pub windows: usize,
    /// Thermostat records written
    pub thermostat_records: usize,
    /// Sensor records written
    pub sensor_records: usize,
    /// Report or sensor rows skipped by the parser
    pub rows_skipped: usize,
    /// Documents the index rejected
    pub bulk_failures: usize,
    /// Bytes archived
    pub bytes: usize,
    /// Whether the index was created during the run
    pub index_created: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ArchiveStats {
    /// Fold in one window
    pub fn add_window(&mut self, report: &WindowReport) {
        self.windows += 1;
        self.thermostat_records += report.thermostat_records;
        self.sensor_records += report.sensor_records;
        self.rows_skipped += report.parse.rows_skipped;
        self.bulk_failures += report.bulk.failed;
        self.bytes += report.bytes;
    }

    /// Total records written
    pub fn records(&self) -> usize {
        self.thermostat_records + self.sensor_records
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
