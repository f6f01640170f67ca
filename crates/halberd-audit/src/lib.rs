//! Halberd Audit - Accessibility check pipeline.
//!
//! This crate implements the control layer around an injected
//! accessibility engine: it merges process-wide default options with
//! per-call overrides, runs the scan with a bounded retry loop, narrows
//! the raw findings to the failure-relevant subset, hands them to
//! pluggable reporters, and converts what remains into a pass/fail
//! outcome.
//!
//! # Features
//!
//! - Shallow option merging with an explicit present/absent model per field
//! - Bounded retry loop that re-scans while relevant violations persist
//! - Impact-based narrowing of raw engine findings
//! - Pluggable reporters whose failures never affect the check outcome
//! - Tagged failure policies (`Any`, `None`, `Severities`) instead of
//!   arbitrary callbacks
//!
//! # Example
//!
//! ```rust,ignore
//! use halberd_audit::{Auditor, CheckOptions};
//! use halberd_browser::{BrowserSession, EngineSource, PageEngine};
//! use halberd_core::Impact;
//!
//! let session = BrowserSession::launch().await?;
//! let page = session.page("https://example.com").await?;
//! let engine = PageEngine::inject(page, &EngineSource::default()).await?;
//!
//! let auditor = Auditor::new(engine).with_defaults(
//!     CheckOptions::new()
//!         .with_retries(2)
//!         .with_included_impacts(vec![Impact::Serious, Impact::Critical]),
//! );
//! auditor.check().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod auditor;
pub mod error;
#[allow(missing_docs)]
pub mod filter;
pub mod gate;
pub mod options;
pub mod report;
pub mod runner;

// Re-export commonly used types
pub use auditor::{Auditor, CheckReport};
pub use error::{AuditError, Result};
pub use filter::ImpactFilter;
pub use gate::{violation_summary, FailurePolicy};
pub use options::{CheckOptions, EffectiveConfig};
pub use report::{JsonReporter, Reporter, ReporterError, ReporterRecord, TableReporter};
pub use runner::{run_scan, ScanOutcome};
