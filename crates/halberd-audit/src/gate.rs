//! Assertion gate: converts filtered findings into the pass/fail outcome.
//!
//! The gate is the single point where a check call passes or fails.
//! Failure selection is a tagged policy rather than an arbitrary
//! callback, so the gate's behavior stays enumerable and testable.

use crate::error::AuditError;
use halberd_core::{Impact, Violation};

/// Which filtered violations fail the run.
///
/// Orthogonal to the impact filter: the filter narrows what is reported
/// and considered at all, the policy decides whether what remains fails
/// the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Any filtered violation fails the run (the default).
    #[default]
    Any,
    /// Report-only mode: violations are reported and summarized but never
    /// fail the run. Retries still run to convergence first.
    None,
    /// Only violations with one of the listed impact levels fail the run.
    Severities(Vec<Impact>),
}

impl FailurePolicy {
    /// The subset of `violations` that fails the run under this policy.
    #[must_use]
    pub fn failing(&self, violations: &[Violation]) -> Vec<Violation> {
        match self {
            Self::Any => violations.to_vec(),
            Self::None => Vec::new(),
            Self::Severities(impacts) => violations
                .iter()
                .filter(|v| v.impact.map_or(false, |impact| impacts.contains(&impact)))
                .cloned()
                .collect(),
        }
    }

    /// Whether this policy can never fail a run.
    #[must_use]
    pub fn is_report_only(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Human-readable summary of a violation set, with correct pluralization.
#[must_use]
pub fn violation_summary(violations: &[Violation]) -> String {
    let count = violations.len();
    let (noun, verb) = if count == 1 {
        ("violation", "was")
    } else {
        ("violations", "were")
    };
    format!("{count} accessibility {noun} {verb} detected")
}

/// Decide the final outcome of a check call.
///
/// Succeeds when the policy selects no failing violations. Violations
/// that were surfaced but did not fail the run (report-only mode, or a
/// severity policy that matched nothing) are still summarized in the log.
pub fn assess(violations: &[Violation], policy: &FailurePolicy) -> Result<(), AuditError> {
    let failing = policy.failing(violations);
    if failing.is_empty() {
        if !violations.is_empty() {
            tracing::warn!(
                violations = violations.len(),
                "{}",
                violation_summary(violations)
            );
        }
        Ok(())
    } else {
        Err(AuditError::ViolationsDetected {
            violations: failing,
        })
    }
}
