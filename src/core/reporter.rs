use crate::domain::model::{FieldError, ReportEntry, RunStats};
use crate::domain::ports::{Clock, ReportSink};
use crate::utils::error::{ImportaError, Result};
use chrono::{DateTime, Duration, FixedOffset, Local};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// 測試用時鐘，只有呼叫 `advance` 才會前進
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Logs the report through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn emit(&self, report: &str) -> Result<()> {
        tracing::info!("\n{}", report);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for FileSink {
    fn emit(&self, report: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, report)?;
        tracing::debug!("Report written to {}", self.path.display());
        Ok(())
    }
}

/// Keeps every emitted report; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    reports: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

impl ReportSink for MemorySink {
    fn emit(&self, report: &str) -> Result<()> {
        let mut reports = self
            .reports
            .lock()
            .map_err(|_| ImportaError::ProcessingError {
                message: "report buffer lock poisoned".to_string(),
            })?;
        reports.push(report.to_string());
        Ok(())
    }
}

/// Accumulates run statistics across one or more batches and renders the
/// summary. Not synchronized: share it across threads only behind a lock.
pub struct Reporter {
    clock: Arc<dyn Clock>,
    sink: Box<dyn ReportSink>,
    stats: RunStats,
    last_report: Option<String>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let stats = RunStats::new(clock.now());
        Self {
            clock,
            sink: Box::new(TracingSink),
            stats,
            last_report: None,
        }
    }

    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn record_transformed(&mut self) {
        self.stats.transformed_records += 1;
    }

    pub fn record_invalid(&mut self, row: usize, errors: Vec<FieldError>) {
        self.stats.invalid_records.push(ReportEntry { row, errors });
    }

    pub fn transformed_records(&self) -> usize {
        self.stats.transformed_records
    }

    pub fn invalid_records(&self) -> &[ReportEntry] {
        &self.stats.invalid_records
    }

    pub fn total_records(&self) -> usize {
        self.stats.total_records()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn last_report(&self) -> Option<&str> {
        self.last_report.as_deref()
    }

    /// Renders the summary at the current clock time and hands it to the sink.
    pub fn report(&mut self) -> Result<String> {
        let finished_at = self.clock.now();
        self.stats.finished_at = Some(finished_at);

        let report = render_report(&self.stats, finished_at);
        self.last_report = Some(report.clone());

        tracing::info!(
            total = self.stats.total_records(),
            transformed = self.stats.transformed_records,
            invalid = self.stats.invalid_records.len(),
            "Import run finished"
        );
        self.sink.emit(&report)?;

        Ok(report)
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("stats", &self.stats)
            .field("last_report", &self.last_report.is_some())
            .finish()
    }
}

fn elapsed_seconds(started_at: DateTime<FixedOffset>, finished_at: DateTime<FixedOffset>) -> f64 {
    let elapsed = finished_at - started_at;
    elapsed
        .num_microseconds()
        .map(|us| us as f64 / 1_000_000.0)
        .unwrap_or_else(|| elapsed.num_seconds() as f64)
}

pub fn render_report(stats: &RunStats, finished_at: DateTime<FixedOffset>) -> String {
    let mut lines = vec![
        "Importa report:".to_string(),
        "---------------".to_string(),
        format!("Started at: {}", stats.started_at.format(TIMESTAMP_FORMAT)),
        format!("Finished at: {}", finished_at.format(TIMESTAMP_FORMAT)),
        format!(
            "Duration: {:?} seconds",
            elapsed_seconds(stats.started_at, finished_at)
        ),
        format!("Total records: {}", stats.total_records()),
        format!("Transformed records: {}", stats.transformed_records),
        format!("Invalid records: {}", stats.invalid_records.len()),
        "Errors:".to_string(),
    ];

    for entry in &stats.invalid_records {
        lines.push(format!("Row {}, Errors: {}", entry.row, entry.errors.len()));
        lines.extend(entry.errors.iter().map(|error| format!("- {}", error)));
    }

    lines.join("\n")
}
