//! Execution engine module
//!
//! Main archive loop.
//!
//! # Overview
//!
//! The engine module provides:
//! - `ArchiveEngine` - runs fetch, transform, save and send per date window
//! - `ArchiveConfig` - index, mapping and pacing for a run
//! - `ArchiveStats` / `WindowReport` - what a run produced
//!
//! Windows are processed strictly one after another; a window is fully
//! materialized before anything is written.

mod types;

pub use types::{ArchiveConfig, ArchiveStats, Stage, WindowReport};

use crate::ecobee::EcobeeClient;
use crate::error::Result;
use crate::output::{to_bulk_ndjson, ArchiveWriter, IndexSink};
use crate::partition::DateWindow;
use crate::runtime::parse_runtime;
use crate::state::AppContext;
use std::time::Instant;
use tracing::{debug, info};

/// Callback invoked when a window enters a stage
pub type ProgressFn = Box<dyn Fn(&DateWindow, Stage) + Send + Sync>;

/// Archive engine for moving runtime reports into an index
pub struct ArchiveEngine<S> {
    /// ecobee API client
    ecobee: EcobeeClient,
    /// Bulk destination
    sink: S,
    /// Archive file writer
    writer: ArchiveWriter,
    /// Run configuration
    config: ArchiveConfig,
    /// Statistics
    stats: ArchiveStats,
    progress: Option<ProgressFn>,
}

impl<S: IndexSink> ArchiveEngine<S> {
    /// Create a new archive engine
    pub fn new(ecobee: EcobeeClient, sink: S, writer: ArchiveWriter) -> Self {
        Self {
            ecobee,
            sink,
            writer,
            config: ArchiveConfig::default(),
            stats: ArchiveStats::default(),
            progress: None,
        }
    }

    /// Set archive configuration
    #[must_use]
    pub fn with_config(mut self, config: ArchiveConfig) -> Self {
        self.config = config;
        self
    }

    /// Report stage transitions to `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: impl Fn(&DateWindow, Stage) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Get statistics
    pub fn stats(&self) -> &ArchiveStats {
        &self.stats
    }

    /// Get the index sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Create the index and archive directory if missing
    pub async fn prepare(&mut self) -> Result<()> {
        let created = self
            .sink
            .ensure_index(&self.config.index, &self.config.mapping)
            .await?;
        self.stats.index_created |= created;
        self.writer.ensure_dir().await
    }

    /// Archive every window in order, pausing between them
    pub async fn run(&mut self, ctx: &mut AppContext, windows: &[DateWindow]) -> Result<ArchiveStats> {
        let start = Instant::now();
        self.prepare().await?;

        info!(
            windows = windows.len(),
            index = %self.config.index,
            "Starting archive"
        );

        for (i, window) in windows.iter().enumerate() {
            if i > 0 && !self.config.pause.is_zero() {
                debug!("Pausing {:?} before next window", self.config.pause);
                tokio::time::sleep(self.config.pause).await;
            }
            self.archive_window(ctx, window).await?;
        }

        #[allow(clippy::cast_possible_truncation)]
        self.stats.set_duration(start.elapsed().as_millis() as u64);

        info!(
            windows = self.stats.windows,
            records = self.stats.records(),
            rows_skipped = self.stats.rows_skipped,
            duration_ms = self.stats.duration_ms,
            "Archive complete"
        );
        Ok(self.stats.clone())
    }

    /// Fetch, transform, save and send a single window
    pub async fn archive_window(
        &mut self,
        ctx: &mut AppContext,
        window: &DateWindow,
    ) -> Result<WindowReport> {
        info!(%window, "Archiving window");

        self.stage(window, Stage::Fetching);
        let body = self
            .ecobee
            .get_runtime_report(ctx, window.start, window.end)
            .await?;

        self.stage(window, Stage::Transforming);
        let data = parse_runtime(&body)?;
        let ndjson = to_bulk_ndjson(&data)?;

        self.stage(window, Stage::Saving);
        let archive_path = self.writer.write(window, &ndjson).await?;

        self.stage(window, Stage::Sending);
        let bytes = ndjson.len();
        let bulk = if data.is_empty() {
            debug!(%window, "No records, skipping bulk request");
            Default::default()
        } else {
            self.sink.bulk(&self.config.index, ndjson).await?
        };

        let report = WindowReport {
            window: *window,
            thermostat_records: data.data.len(),
            sensor_records: data.sensor_data.len(),
            parse: data.stats,
            archive_path,
            bytes,
            bulk,
        };
        self.stats.add_window(&report);

        info!(
            %window,
            thermostat = report.thermostat_records,
            sensor = report.sensor_records,
            skipped = report.parse.rows_skipped,
            "Window done"
        );
        Ok(report)
    }

    fn stage(&self, window: &DateWindow, stage: Stage) {
        debug!(%window, %stage, "Stage");
        if let Some(progress) = &self.progress {
            progress(window, stage);
        }
    }
}
