//! Pipeline error types.
//!
//! Only engine failures abort a check before it produces a result.
//! Detected violations are the expected test-failure outcome, not a
//! defect, and carry the findings that caused them. Reporter failures
//! never surface here; the dispatcher logs and swallows them.

use crate::gate::violation_summary;
use halberd_core::{EngineError, Violation};
use thiserror::Error;

/// Errors surfaced by a check call.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The engine bundle was unavailable or the engine rejected an
    /// invocation. Fatal for the current call and never retried.
    #[error("{0}")]
    Engine(#[from] EngineError),

    /// The check completed and failing violations remained. Displays the
    /// standard assertion message with correct pluralization.
    #[error("{}", violation_summary(.violations))]
    ViolationsDetected {
        /// Violations that failed the run, after filtering and policy
        violations: Vec<Violation>,
    },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AuditError>;
