//! Reporters: side-effect sinks for violation sets.
//!
//! Reporters observe outcomes, they never influence them. A reporter that
//! fails is logged and skipped so one broken sink cannot mask the
//! violations the check found, and only non-empty violation sets are
//! dispatched at all.

use crate::gate::violation_summary;
use halberd_core::Violation;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write;
use std::sync::Mutex;
use thiserror::Error;

/// Why a reporter could not record a violation set.
#[derive(Debug, Error)]
pub enum ReporterError {
    /// The sink rejected the write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be serialized.
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Reporter-specific failure.
    #[error("{0}")]
    Failed(String),
}

/// What a reporter receives: the violations plus enough context to label
/// where they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterRecord {
    /// Scanned page URL, or the configured source name when the engine
    /// reported none.
    pub filename: String,
    /// Violations that survived the impact filter.
    pub results: Vec<Violation>,
    /// Caller-supplied label for this check, if any.
    pub label: Option<String>,
}

/// A sink for violation records.
///
/// Implementations only ever see non-empty violation sets; clean checks
/// are not dispatched.
pub trait Reporter: Send + Sync {
    /// Short name used when logging reporter failures.
    fn name(&self) -> &str;

    /// Record one violation set.
    fn report(&self, record: &ReporterRecord) -> Result<(), ReporterError>;
}

/// Send `record` to every reporter in turn.
///
/// Empty records are skipped entirely. A failing reporter is logged and
/// the remaining reporters still run; reporting never fails the check.
pub fn dispatch(reporters: &[Box<dyn Reporter>], record: &ReporterRecord) {
    if record.results.is_empty() {
        return;
    }
    for reporter in reporters {
        if let Err(e) = reporter.report(record) {
            tracing::warn!(
                reporter = reporter.name(),
                error = %e,
                "reporter failed, continuing"
            );
        }
    }
}

/// Log each violation individually, one warning per rule.
pub fn log_violations(violations: &[Violation]) {
    for violation in violations {
        let nodes = violation.nodes.len();
        tracing::warn!(
            rule = %violation.id,
            impact = violation.impact.map_or("none", |i| i.as_str()),
            nodes,
            selectors = %violation.selector_list(),
            "{} on {} node{}",
            violation.id,
            nodes,
            if nodes == 1 { "" } else { "s" }
        );
    }
}

/// Default reporter: a plain-text impact/description/nodes table emitted
/// through the logger.
#[derive(Debug, Default)]
pub struct TableReporter;

impl TableReporter {
    /// Create the table reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for TableReporter {
    fn name(&self) -> &str {
        "table"
    }

    fn report(&self, record: &ReporterRecord) -> Result<(), ReporterError> {
        let label = record.label.as_deref().unwrap_or("");
        tracing::info!(
            filename = %record.filename,
            label,
            "{}\n{}",
            violation_summary(&record.results),
            render_table(record)
        );
        Ok(())
    }
}

fn render_table(record: &ReporterRecord) -> String {
    const HEADERS: [&str; 3] = ["impact", "description", "nodes"];

    let rows: Vec<[String; 3]> = record
        .results
        .iter()
        .map(|violation| {
            [
                violation
                    .impact
                    .map_or_else(|| "-".to_string(), |i| i.as_str().to_string()),
                violation.description.clone(),
                violation.nodes.len().to_string(),
            ]
        })
        .collect();

    let mut widths = [HEADERS[0].len(), HEADERS[1].len(), HEADERS[2].len()];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let header: [String; 3] = [
        HEADERS[0].to_string(),
        HEADERS[1].to_string(),
        HEADERS[2].to_string(),
    ];
    render_row(&mut out, &header, &widths);
    let rule: [String; 3] = [
        "-".repeat(widths[0]),
        "-".repeat(widths[1]),
        "-".repeat(widths[2]),
    ];
    render_row(&mut out, &rule, &widths);
    for row in &rows {
        render_row(&mut out, row, &widths);
    }
    out
}

fn render_row(out: &mut String, cells: &[String; 3], widths: &[usize; 3]) {
    let _ = writeln!(
        out,
        "{:<w0$}  {:<w1$}  {:<w2$}",
        cells[0],
        cells[1],
        cells[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2]
    );
}

/// Reporter that writes records as JSON lines to any writer.
#[derive(Debug)]
pub struct JsonReporter<W> {
    sink: Mutex<W>,
}

impl<W: Write + Send> JsonReporter<W> {
    /// Wrap a writer. Each reported record becomes one JSON line.
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Take the writer back, for example to inspect a buffer in tests.
    #[must_use]
    pub fn into_inner(self) -> W {
        match self.sink.into_inner() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> Reporter for JsonReporter<W> {
    fn name(&self) -> &str {
        "json"
    }

    fn report(&self, record: &ReporterRecord) -> Result<(), ReporterError> {
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| ReporterError::Failed("json sink lock poisoned".to_string()))?;
        serde_json::to_writer(&mut *sink, record)?;
        sink.write_all(b"\n")?;
        Ok(())
    }
}
