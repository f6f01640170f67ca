//! Check options: normalization, merging, and resolution.
//!
//! Options enter the pipeline from three places: built-in defaults, the
//! process-wide defaults stored on the auditor, and per-call overrides.
//! Every field is an explicit `Option` so "provided" and "absent" stay
//! distinguishable until [`CheckOptions::resolve`] applies the defaults.
//!
//! Loosely-typed JSON options (the shape the engine ecosystem uses) are
//! admitted through exactly one boundary, [`CheckOptions::from_json`],
//! which also lifts the pipeline-owned keys out of the engine options
//! object.

use crate::filter::ImpactFilter;
use crate::gate::FailurePolicy;
use halberd_core::config::CheckConfig;
use halberd_core::Impact;
use serde_json::{Map, Value};
use std::time::Duration;

/// Delay between re-scans when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// Retry budget when none is configured: scan exactly once.
pub const DEFAULT_RETRIES: u32 = 0;

/// Keys interpreted by the pipeline itself; always stripped from the
/// options forwarded to the engine, wherever they came from.
const PIPELINE_KEYS: [&str; 4] = ["includedImpacts", "interval", "retries", "reportOnly"];

/// Options for one check call, or process-wide defaults for all calls.
///
/// Absent fields fall back to the stored defaults, then to the built-in
/// defaults; see [`CheckOptions::overlay`] and [`CheckOptions::resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckOptions {
    /// Engine run options (rule selection, tags, and similar), opaque to
    /// the pipeline and forwarded verbatim.
    pub run_options: Option<Value>,
    /// Impact levels a violation must have to be considered at all.
    pub included_impacts: Option<Vec<Impact>>,
    /// Delay between re-scans.
    pub interval: Option<Duration>,
    /// Number of re-scans allowed while relevant violations persist.
    pub retries: Option<u32>,
    /// Which of the considered violations fail the run.
    pub failure_policy: Option<FailurePolicy>,
}

impl CheckOptions {
    /// Options with every field absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine run options forwarded verbatim to the engine.
    #[must_use]
    pub fn with_run_options(mut self, run_options: Value) -> Self {
        self.run_options = Some(run_options);
        self
    }

    /// Set the impact levels a violation must have to be considered.
    #[must_use]
    pub fn with_included_impacts(mut self, impacts: Vec<Impact>) -> Self {
        self.included_impacts = Some(impacts);
        self
    }

    /// Set the delay between re-scans.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the number of re-scans allowed while violations persist.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Set the failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    /// Normalize a loosely-typed JSON options value.
    ///
    /// This is the single boundary where the emptiness and leniency rules
    /// apply: `null`, a non-object value, and `{}` all mean "nothing
    /// provided"; the pipeline-owned keys `includedImpacts`, `interval`,
    /// `retries`, and `reportOnly` are lifted into typed fields; whatever
    /// remains becomes the forwarded engine options. Malformed pipeline
    /// values degrade to "absent" with a warning instead of failing the
    /// check.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        if map.is_empty() {
            return Self::default();
        }

        let mut rest = map.clone();
        let included_impacts = rest
            .remove("includedImpacts")
            .and_then(|v| parse_impacts(&v));
        let interval = rest.remove("interval").and_then(|v| parse_interval(&v));
        let retries = rest.remove("retries").and_then(|v| parse_retries(&v));
        let failure_policy = rest
            .remove("reportOnly")
            .and_then(|v| parse_report_only(&v));
        let run_options = if rest.is_empty() {
            None
        } else {
            Some(Value::Object(rest))
        };

        Self {
            run_options,
            included_impacts,
            interval,
            retries,
            failure_policy,
        }
    }

    /// Pipeline defaults from the `[check]` section of the TOML config.
    ///
    /// Impact label lists parse leniently, like everything else at this
    /// boundary; `report_only` wins over `fail_on` when both are set.
    #[must_use]
    pub fn from_config(config: &CheckConfig) -> Self {
        let included_impacts = if config.included_impacts.is_empty() {
            None
        } else {
            let parsed = Impact::parse_list(&config.included_impacts);
            if parsed.is_none() {
                tracing::warn!(
                    labels = ?config.included_impacts,
                    "unrecognized included_impacts labels, filtering disabled"
                );
            }
            parsed
        };

        let failure_policy = if config.report_only {
            Some(FailurePolicy::None)
        } else if config.fail_on.is_empty() {
            None
        } else {
            match Impact::parse_list(&config.fail_on) {
                Some(impacts) => Some(FailurePolicy::Severities(impacts)),
                None => {
                    tracing::warn!(
                        labels = ?config.fail_on,
                        "unrecognized fail_on labels, any violation fails"
                    );
                    None
                }
            }
        };

        Self {
            run_options: None,
            included_impacts,
            interval: Some(Duration::from_millis(config.interval_ms)),
            retries: Some(config.retries),
            failure_policy,
        }
    }

    /// Shallow field-wise merge: a field present in `overrides` replaces
    /// the default wholesale. Nested run-option JSON is never deep-merged.
    #[must_use]
    pub fn overlay(defaults: Self, overrides: Self) -> Self {
        Self {
            run_options: overrides.run_options.or(defaults.run_options),
            included_impacts: overrides.included_impacts.or(defaults.included_impacts),
            interval: overrides.interval.or(defaults.interval),
            retries: overrides.retries.or(defaults.retries),
            failure_policy: overrides.failure_policy.or(defaults.failure_policy),
        }
    }

    /// Resolve into the effective per-scan configuration, applying the
    /// built-in defaults to absent fields.
    ///
    /// The pipeline-owned keys are stripped from the forwarded run
    /// options here regardless of how they were supplied, so the engine
    /// never sees them. Stripped here means dropped: keys embedded in a
    /// typed run-options object are not lifted into fields, that only
    /// happens at [`CheckOptions::from_json`].
    #[must_use]
    pub fn resolve(self) -> EffectiveConfig {
        let mut run_options = self
            .run_options
            .unwrap_or_else(|| Value::Object(Map::new()));
        if let Value::Object(map) = &mut run_options {
            for key in PIPELINE_KEYS {
                if map.remove(key).is_some() {
                    tracing::debug!(key, "discarding pipeline-owned key from engine run options");
                }
            }
        }

        EffectiveConfig {
            run_options,
            filter: ImpactFilter::new(self.included_impacts),
            interval: self.interval.unwrap_or(DEFAULT_INTERVAL),
            retries: self.retries.unwrap_or(DEFAULT_RETRIES),
            policy: self.failure_policy.unwrap_or_default(),
        }
    }
}

/// Per-scan configuration after defaults and overrides are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    /// Options forwarded verbatim to the engine, pipeline keys removed
    pub run_options: Value,
    /// Narrows raw violations to the failure-relevant subset
    pub filter: ImpactFilter,
    /// Delay between re-scans
    pub interval: Duration,
    /// Re-scans allowed while relevant violations persist
    pub retries: u32,
    /// Which violations fail the run
    pub policy: FailurePolicy,
}

fn parse_impacts(value: &Value) -> Option<Vec<Impact>> {
    let Some(items) = value.as_array() else {
        tracing::warn!(%value, "includedImpacts is not a list, filtering disabled");
        return None;
    };
    let labels: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
    let Some(labels) = labels else {
        tracing::warn!(%value, "includedImpacts contains non-string entries, filtering disabled");
        return None;
    };
    let parsed = Impact::parse_list(&labels);
    if parsed.is_none() && !labels.is_empty() {
        tracing::warn!(?labels, "unrecognized impact labels, filtering disabled");
    }
    parsed
}

fn parse_interval(value: &Value) -> Option<Duration> {
    match value.as_u64() {
        Some(ms) => Some(Duration::from_millis(ms)),
        None => {
            tracing::warn!(%value, "interval is not a millisecond count, using the default");
            None
        }
    }
}

fn parse_retries(value: &Value) -> Option<u32> {
    match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
        Some(retries) => Some(retries),
        None => {
            tracing::warn!(%value, "retries is not a retry count, using the default");
            None
        }
    }
}

fn parse_report_only(value: &Value) -> Option<FailurePolicy> {
    match value.as_bool() {
        Some(true) => Some(FailurePolicy::None),
        Some(false) => Some(FailurePolicy::Any),
        None => {
            tracing::warn!(%value, "reportOnly is not a boolean, ignoring it");
            None
        }
    }
}
