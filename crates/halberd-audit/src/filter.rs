#![allow(clippy::must_use_candidate)]

use halberd_core::{Impact, Violation};

/// Narrows raw engine violations to the failure-relevant subset.
///
/// An inactive filter (no impact levels) is the identity. An active
/// filter keeps violations whose impact is in the included set and drops
/// violations the engine did not rank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpactFilter {
    included: Option<Vec<Impact>>,
}

impl ImpactFilter {
    /// Build a filter from an optional impact list. `None` and an empty
    /// list both mean "no filtering".
    pub fn new(included: Option<Vec<Impact>>) -> Self {
        let included = included.filter(|impacts| !impacts.is_empty());
        Self { included }
    }

    /// A filter that passes every violation through.
    pub fn none() -> Self {
        Self::default()
    }

    /// A filter keeping only the given impact levels.
    pub fn including(impacts: Vec<Impact>) -> Self {
        Self::new(Some(impacts))
    }

    pub fn is_active(&self) -> bool {
        self.included.is_some()
    }

    /// Impact levels this filter keeps, when active.
    pub fn included(&self) -> Option<&[Impact]> {
        self.included.as_deref()
    }

    pub fn matches(&self, violation: &Violation) -> bool {
        match &self.included {
            None => true,
            Some(impacts) => violation
                .impact
                .map_or(false, |impact| impacts.contains(&impact)),
        }
    }

    /// Apply the filter to a raw violation set.
    ///
    /// Filtering only narrows: the result is always a subset of the
    /// input, and applying the same filter again changes nothing.
    pub fn apply(&self, violations: &[Violation]) -> Vec<Violation> {
        violations
            .iter()
            .filter(|violation| self.matches(violation))
            .cloned()
            .collect()
    }
}
