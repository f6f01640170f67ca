//! Shared types used across the Halberd workspace.
//!
//! This module defines the data model exchanged between the injected
//! accessibility engine and the check pipeline: impact levels, violations
//! and their affected nodes, the full scan result envelope, and the scan
//! target selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Impact (severity) level of a violation, ranked from least to most severe.
///
/// The ordering derives from the declaration order, so
/// `Impact::Minor < Impact::Critical` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Cosmetic or low-consequence failure
    Minor,
    /// Noticeable barrier for some users
    Moderate,
    /// Serious barrier for many users
    Serious,
    /// Blocks access entirely for affected users
    Critical,
}

impl Impact {
    /// All impact levels in ascending order of severity.
    pub const ALL: [Impact; 4] = [
        Impact::Minor,
        Impact::Moderate,
        Impact::Serious,
        Impact::Critical,
    ];

    /// The lowercase wire label for this impact level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Serious => "serious",
            Self::Critical => "critical",
        }
    }

    /// Parse a single impact label, ignoring surrounding whitespace and case.
    ///
    /// Returns `None` for unrecognized labels; the caller decides whether
    /// that is an error or a degradation.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|impact| impact.as_str().eq_ignore_ascii_case(label))
    }

    /// Parse a list of impact labels with the lenient all-or-none rule:
    /// the list parses only if every label is recognized, and an empty or
    /// unparseable list yields `None` ("no filter").
    ///
    /// This leniency is deliberate and matches the original behavior of the
    /// pipeline: a malformed impact filter disables filtering instead of
    /// failing the check.
    #[must_use]
    pub fn parse_list<S: AsRef<str>>(labels: &[S]) -> Option<Vec<Self>> {
        if labels.is_empty() {
            return None;
        }
        labels
            .iter()
            .map(|label| Self::from_label(label.as_ref()))
            .collect()
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A selector identifying one offending element.
///
/// Engines report most targets as a single CSS selector string. Elements
/// inside iframes or shadow roots arrive as a chain of selectors, outermost
/// frame first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSelector {
    /// Plain CSS selector
    Css(String),
    /// Selector chain crossing frame or shadow boundaries
    FrameChain(Vec<String>),
}

impl fmt::Display for NodeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(selector) => write!(f, "{selector}"),
            Self::FrameChain(chain) => write!(f, "{}", chain.join(" ")),
        }
    }
}

/// One affected element of a violation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViolationNode {
    /// Selectors identifying the element (never empty for a reported node)
    pub target: Vec<NodeSelector>,
    /// Outer HTML snippet of the element, when the engine captured one
    pub html: Option<String>,
    /// Engine-worded explanation of what failed on this element
    pub failure_summary: Option<String>,
}

/// One accessibility rule failure reported by the engine.
///
/// The engine contract guarantees that a reported violation carries at
/// least one node descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Violation {
    /// Stable rule identifier, e.g. `image-alt`
    pub id: String,
    /// Impact level; absent when the engine did not rank the rule.
    /// Unrecognized labels decode as absent rather than failing the scan.
    #[serde(deserialize_with = "lenient_impact")]
    pub impact: Option<Impact>,
    /// Human description of the rule
    pub description: String,
    /// Short remediation hint
    pub help: Option<String>,
    /// Link to the rule documentation
    pub help_url: Option<String>,
    /// Rule tags (standards clauses, rule sets)
    pub tags: Vec<String>,
    /// Affected elements
    pub nodes: Vec<ViolationNode>,
}

impl Violation {
    /// Combined selector list of all affected nodes, joined for display
    /// and highlighting.
    #[must_use]
    pub fn selector_list(&self) -> String {
        self.nodes
            .iter()
            .flat_map(|node| node.target.iter())
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn lenient_impact<'de, D>(deserializer: D) -> Result<Option<Impact>, D::Error>
where
    D: Deserializer<'de>,
{
    let label: Option<String> = Option::deserialize(deserializer)?;
    Ok(label.as_deref().and_then(Impact::from_label))
}

/// Name and version of the engine that produced a scan result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineInfo {
    /// Engine name, e.g. `axe-core`
    pub name: String,
    /// Engine version string
    pub version: String,
}

/// Full output of one engine invocation.
///
/// The pipeline only interprets `violations`; the other partitions are
/// carried as raw JSON so callers can inspect them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanResults {
    /// Rule failures
    pub violations: Vec<Violation>,
    /// Rules that passed (uninterpreted)
    pub passes: Vec<Value>,
    /// Rules the engine could not decide (uninterpreted)
    pub incomplete: Vec<Value>,
    /// Rules that did not apply (uninterpreted)
    pub inapplicable: Vec<Value>,
    /// URL of the scanned document, when the engine reports one
    pub url: Option<String>,
    /// Time the engine completed the scan
    pub timestamp: Option<DateTime<Utc>>,
    /// Engine identification
    pub test_engine: Option<EngineInfo>,
}

/// Region of the document a scan covers.
///
/// Immutable per scan invocation; constructed fresh for every check call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanTarget {
    /// Scan the whole document
    #[default]
    Document,
    /// Scan the subtree matching a CSS selector
    Selector(String),
}

impl ScanTarget {
    /// Normalize a loosely-typed context value into a target.
    ///
    /// `null`, an empty object, and an empty string all mean "not provided"
    /// and select the whole document. This emptiness rule is applied here,
    /// at the boundary, and nowhere else.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(selector) if !selector.trim().is_empty() => {
                Self::Selector(selector.clone())
            }
            _ => Self::Document,
        }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Selector(selector) => write!(f, "{selector}"),
        }
    }
}

impl From<&str> for ScanTarget {
    fn from(selector: &str) -> Self {
        if selector.trim().is_empty() {
            Self::Document
        } else {
            Self::Selector(selector.to_string())
        }
    }
}

impl From<String> for ScanTarget {
    fn from(selector: String) -> Self {
        Self::from(selector.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_impact_ordering() {
        assert!(Impact::Minor < Impact::Moderate);
        assert!(Impact::Moderate < Impact::Serious);
        assert!(Impact::Serious < Impact::Critical);
    }

    #[test]
    fn test_impact_labels() {
        assert_eq!(Impact::from_label("serious"), Some(Impact::Serious));
        assert_eq!(Impact::from_label(" Critical "), Some(Impact::Critical));
        assert_eq!(Impact::from_label("catastrophic"), None);
        assert_eq!(Impact::from_label(""), None);
    }

    #[test]
    fn test_impact_serde() {
        let json = serde_json::to_string(&Impact::Moderate).expect("serialize impact");
        assert_eq!(json, "\"moderate\"");
        let parsed: Impact = serde_json::from_str("\"critical\"").expect("deserialize impact");
        assert_eq!(parsed, Impact::Critical);
    }

    #[test]
    fn test_parse_list_all_or_none() {
        let parsed = Impact::parse_list(&["serious", "critical"]);
        assert_eq!(parsed, Some(vec![Impact::Serious, Impact::Critical]));

        // One unrecognized label disables the whole list.
        assert_eq!(Impact::parse_list(&["serious", "bogus"]), None);
        assert_eq!(Impact::parse_list::<&str>(&[]), None);
    }

    #[test]
    fn test_violation_decode_minimal() {
        let violation: Violation = serde_json::from_value(json!({
            "id": "image-alt",
            "impact": "critical",
            "description": "Images must have alternate text",
            "nodes": [{ "target": ["img"] }]
        }))
        .expect("decode violation");

        assert_eq!(violation.id, "image-alt");
        assert_eq!(violation.impact, Some(Impact::Critical));
        assert_eq!(violation.nodes.len(), 1);
    }

    #[test]
    fn test_violation_unknown_impact_is_absent() {
        let violation: Violation = serde_json::from_value(json!({
            "id": "custom-rule",
            "impact": "weird-level",
            "nodes": [{ "target": ["main"] }]
        }))
        .expect("decode violation");
        assert_eq!(violation.impact, None);

        let violation: Violation = serde_json::from_value(json!({
            "id": "custom-rule",
            "nodes": [{ "target": ["main"] }]
        }))
        .expect("decode violation without impact");
        assert_eq!(violation.impact, None);
    }

    #[test]
    fn test_selector_list_joins_all_nodes() {
        let violation: Violation = serde_json::from_value(json!({
            "id": "color-contrast",
            "nodes": [
                { "target": [".header"] },
                { "target": ["#main", ["iframe", ".inner"]] }
            ]
        }))
        .expect("decode violation");

        assert_eq!(violation.selector_list(), ".header, #main, iframe .inner");
    }

    #[test]
    fn test_scan_results_decode() {
        let results: ScanResults = serde_json::from_value(json!({
            "violations": [
                { "id": "label", "impact": "serious", "nodes": [{ "target": ["input"] }] }
            ],
            "passes": [{ "id": "document-title" }],
            "incomplete": [],
            "url": "https://example.com/",
            "timestamp": "2025-03-01T12:30:00.000Z",
            "testEngine": { "name": "axe-core", "version": "4.10.2" }
        }))
        .expect("decode scan results");

        assert_eq!(results.violations.len(), 1);
        assert_eq!(results.passes.len(), 1);
        assert_eq!(results.url.as_deref(), Some("https://example.com/"));
        assert_eq!(
            results.test_engine.as_ref().map(|e| e.version.as_str()),
            Some("4.10.2")
        );
        assert!(results.timestamp.is_some());
    }

    #[test]
    fn test_scan_target_normalization() {
        assert_eq!(ScanTarget::from_json(&Value::Null), ScanTarget::Document);
        assert_eq!(ScanTarget::from_json(&json!({})), ScanTarget::Document);
        assert_eq!(ScanTarget::from_json(&json!("")), ScanTarget::Document);
        assert_eq!(
            ScanTarget::from_json(&json!("#content")),
            ScanTarget::Selector("#content".to_string())
        );
        assert_eq!(ScanTarget::from(""), ScanTarget::Document);
        assert_eq!(
            ScanTarget::from("nav"),
            ScanTarget::Selector("nav".to_string())
        );
    }
}
