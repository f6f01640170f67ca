//! The auditor: pipeline context tying engine, defaults, and reporters
//! together.
//!
//! One auditor wraps one configured engine. Defaults and reporters are
//! mutated through `&mut self`, so the borrow checker serializes
//! configuration with in-flight checks; a check never observes a
//! half-applied configuration change.

use crate::error::Result;
use crate::gate;
use crate::options::CheckOptions;
use crate::report::{self, Reporter, ReporterRecord, TableReporter};
use crate::runner::{self, ScanOutcome};
use halberd_core::{ScanEngine, ScanResults, ScanTarget, Violation};
use serde_json::Value;

const DEFAULT_SOURCE_NAME: &str = "document";

/// Outcome of a passing check (a failing check is the
/// [`AuditError::ViolationsDetected`](crate::AuditError::ViolationsDetected)
/// error instead).
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Full results of the final scan, unfiltered.
    pub results: ScanResults,
    /// Violations that survived the impact filter. Non-empty only under a
    /// policy that tolerates them.
    pub violations: Vec<Violation>,
    /// How many scans ran, including the first.
    pub attempts: u32,
    /// Caller-supplied label for this check, if any.
    pub label: Option<String>,
}

impl CheckReport {
    /// Whether the final scan found no relevant violations at all.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Runs checks against one engine with stored defaults and reporters.
pub struct Auditor<E> {
    engine: E,
    defaults: CheckOptions,
    reporters: Vec<Box<dyn Reporter>>,
    source_name: String,
}

impl<E: ScanEngine> Auditor<E> {
    /// Wrap an engine with built-in defaults and the table reporter.
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            defaults: CheckOptions::default(),
            reporters: vec![Box::new(TableReporter::new())],
            source_name: DEFAULT_SOURCE_NAME.to_string(),
        }
    }

    /// Replace the stored default options.
    #[must_use]
    pub fn with_defaults(mut self, defaults: CheckOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Add a reporter alongside the existing ones.
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }

    /// Replace the reporter set wholesale. An empty set silences
    /// reporting without affecting pass/fail behavior.
    #[must_use]
    pub fn with_reporters(mut self, reporters: Vec<Box<dyn Reporter>>) -> Self {
        self.reporters = reporters;
        self
    }

    /// Name used in reports when the engine does not report a URL, for
    /// example when scanning a local file or an in-memory document.
    #[must_use]
    pub fn with_source(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }

    /// The stored default options.
    #[must_use]
    pub fn defaults(&self) -> &CheckOptions {
        &self.defaults
    }

    /// The wrapped engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Forward an engine-specific configuration document to the engine.
    pub async fn configure_engine(&self, spec: &Value) -> Result<()> {
        self.engine.configure(spec).await?;
        Ok(())
    }

    /// Overlay new defaults onto the stored ones. Fields absent in
    /// `overrides` keep their current values.
    pub fn configure_pipeline(&mut self, overrides: CheckOptions) {
        self.defaults = CheckOptions::overlay(self.defaults.clone(), overrides);
    }

    /// Check the whole document with the stored defaults.
    pub async fn check(&self) -> Result<CheckReport> {
        self.check_with(ScanTarget::Document, CheckOptions::default(), None)
            .await
    }

    /// Run one check: scan with retry, report what persisted, then judge
    /// it against the failure policy.
    ///
    /// `overrides` are overlaid per-field onto the stored defaults for
    /// this call only.
    ///
    /// # Errors
    ///
    /// [`AuditError::Engine`](crate::AuditError::Engine) when the engine
    /// rejects a scan, and
    /// [`AuditError::ViolationsDetected`](crate::AuditError::ViolationsDetected)
    /// when violations persist that the failure policy does not tolerate.
    /// Reporter failures are logged, never returned.
    pub async fn check_with(
        &self,
        target: impl Into<ScanTarget>,
        overrides: CheckOptions,
        label: Option<&str>,
    ) -> Result<CheckReport> {
        let target = target.into();
        let config = CheckOptions::overlay(self.defaults.clone(), overrides).resolve();
        tracing::debug!(%target, retries = config.retries, "starting accessibility check");

        let ScanOutcome {
            raw,
            filtered,
            attempts,
        } = runner::run_scan(&self.engine, &target, &config).await?;

        if !filtered.is_empty() {
            let record = ReporterRecord {
                filename: raw.url.clone().unwrap_or_else(|| self.source_name.clone()),
                results: filtered.clone(),
                label: label.map(ToString::to_string),
            };
            report::dispatch(&self.reporters, &record);
            report::log_violations(&filtered);
        }

        gate::assess(&filtered, &config.policy)?;

        Ok(CheckReport {
            results: raw,
            violations: filtered,
            attempts,
            label: label.map(ToString::to_string),
        })
    }
}
