//! End-to-end pipeline tests against a scripted engine.
//!
//! These cover the full check path: option merging, the retry loop,
//! impact filtering, reporter dispatch, and the assertion gate, with no
//! browser involved.

use async_trait::async_trait;
use halberd_audit::{
    AuditError, Auditor, CheckOptions, FailurePolicy, Reporter, ReporterError, ReporterRecord,
};
use halberd_core::{
    EngineError, EngineResult, Impact, NodeSelector, ScanEngine, ScanResults, ScanTarget,
    Violation, ViolationNode,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays a fixed sequence of scan results, then clean results forever,
/// recording everything the pipeline sends it.
struct ScriptedEngine {
    script: Mutex<VecDeque<ScanResults>>,
    run_calls: AtomicUsize,
    run_options_seen: Mutex<Vec<Value>>,
    targets_seen: Mutex<Vec<ScanTarget>>,
}

impl ScriptedEngine {
    fn new(script: Vec<ScanResults>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            run_calls: AtomicUsize::new(0),
            run_options_seen: Mutex::new(Vec::new()),
            targets_seen: Mutex::new(Vec::new()),
        }
    }

    fn clean() -> Self {
        Self::new(Vec::new())
    }

    fn run_calls(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScanEngine for ScriptedEngine {
    async fn configure(&self, _spec: &Value) -> EngineResult<()> {
        Ok(())
    }

    async fn run(&self, target: &ScanTarget, options: &Value) -> EngineResult<ScanResults> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        self.targets_seen
            .lock()
            .expect("targets lock")
            .push(target.clone());
        self.run_options_seen
            .lock()
            .expect("options lock")
            .push(options.clone());
        Ok(self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_default())
    }
}

struct RejectingEngine;

#[async_trait]
impl ScanEngine for RejectingEngine {
    async fn configure(&self, _spec: &Value) -> EngineResult<()> {
        Ok(())
    }

    async fn run(&self, _target: &ScanTarget, _options: &Value) -> EngineResult<ScanResults> {
        Err(EngineError::Invocation("axe is not defined".to_string()))
    }
}

#[derive(Clone, Default)]
struct RecordingReporter {
    records: Arc<Mutex<Vec<ReporterRecord>>>,
}

impl RecordingReporter {
    fn records(&self) -> Vec<ReporterRecord> {
        self.records.lock().expect("records lock").clone()
    }
}

impl Reporter for RecordingReporter {
    fn name(&self) -> &str {
        "recording"
    }

    fn report(&self, record: &ReporterRecord) -> Result<(), ReporterError> {
        self.records
            .lock()
            .expect("records lock")
            .push(record.clone());
        Ok(())
    }
}

fn violation(id: &str, impact: Option<Impact>) -> Violation {
    Violation {
        id: id.to_string(),
        impact,
        description: format!("{id} description"),
        nodes: vec![ViolationNode {
            target: vec![NodeSelector::Css(format!("#{id}"))],
            ..ViolationNode::default()
        }],
        ..Violation::default()
    }
}

fn results(violations: Vec<Violation>) -> ScanResults {
    ScanResults {
        violations,
        url: Some("https://example.com/".to_string()),
        ..ScanResults::default()
    }
}

#[tokio::test]
async fn test_severity_filter_narrows_and_fails() {
    let engine = ScriptedEngine::new(vec![results(vec![
        violation("aria-roles", Some(Impact::Serious)),
        violation("color-contrast", Some(Impact::Minor)),
    ])]);
    let recording = RecordingReporter::default();
    let auditor = Auditor::new(engine).with_reporter(recording.clone());

    let err = auditor
        .check_with(
            ScanTarget::Document,
            CheckOptions::new().with_included_impacts(vec![Impact::Serious]),
            None,
        )
        .await
        .expect_err("serious violation fails the check");

    assert_eq!(err.to_string(), "1 accessibility violation was detected");
    match err {
        AuditError::ViolationsDetected { violations } => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].id, "aria-roles");
        }
        other => panic!("unexpected error: {other}"),
    }

    // The reporter saw exactly what the filter kept.
    let records = recording.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].filename, "https://example.com/");
    assert_eq!(records[0].results.len(), 1);
    assert_eq!(records[0].results[0].id, "aria-roles");
}

#[tokio::test]
async fn test_clean_scan_passes_without_reporting() {
    let recording = RecordingReporter::default();
    let auditor = Auditor::new(ScriptedEngine::clean()).with_reporter(recording.clone());

    let report = auditor.check().await.expect("clean scan passes");

    assert!(report.is_clean());
    assert_eq!(report.attempts, 1);
    assert!(recording.records().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_retries_until_violations_clear() {
    let engine = ScriptedEngine::new(vec![
        results(vec![violation("label", Some(Impact::Critical))]),
        results(vec![violation("label", Some(Impact::Critical))]),
    ]);
    let auditor = Auditor::new(engine).with_defaults(
        CheckOptions::new()
            .with_retries(3)
            .with_interval(Duration::from_millis(100)),
    );

    let report = auditor.check().await.expect("violations clear in time");

    assert!(report.is_clean());
    assert_eq!(report.attempts, 3);
    assert_eq!(auditor.engine().run_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retry_budget_exhaustion_fails() {
    let engine = ScriptedEngine::new(vec![
        results(vec![violation("label", Some(Impact::Critical))]),
        results(vec![violation("label", Some(Impact::Critical))]),
        results(vec![violation("label", Some(Impact::Critical))]),
    ]);
    let auditor = Auditor::new(engine).with_defaults(
        CheckOptions::new()
            .with_retries(1)
            .with_interval(Duration::from_millis(10)),
    );

    let err = auditor.check().await.expect_err("budget runs out");

    assert_eq!(err.to_string(), "1 accessibility violation was detected");
    assert_eq!(auditor.engine().run_calls(), 2);
}

#[tokio::test]
async fn test_report_only_reports_but_passes() {
    let engine = ScriptedEngine::new(vec![results(vec![
        violation("image-alt", Some(Impact::Critical)),
        violation("region", None),
    ])]);
    let recording = RecordingReporter::default();
    let auditor = Auditor::new(engine)
        .with_reporter(recording.clone())
        .with_defaults(CheckOptions::new().with_policy(FailurePolicy::None));

    let report = auditor.check().await.expect("report-only never fails");

    assert!(!report.is_clean());
    assert_eq!(report.violations.len(), 2);
    let records = recording.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].results.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_report_only_still_runs_retries() {
    // Report-only changes the verdict, not the convergence loop.
    let engine = ScriptedEngine::new(vec![
        results(vec![violation("label", Some(Impact::Serious))]),
        results(vec![violation("label", Some(Impact::Serious))]),
    ]);
    let auditor = Auditor::new(engine).with_defaults(
        CheckOptions::new()
            .with_policy(FailurePolicy::None)
            .with_retries(5)
            .with_interval(Duration::from_millis(10)),
    );

    let report = auditor.check().await.expect("report-only passes");

    assert_eq!(report.attempts, 3);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_json_options_configure_the_check() {
    let engine = ScriptedEngine::new(vec![results(vec![violation(
        "color-contrast",
        Some(Impact::Minor),
    )])]);
    let auditor = Auditor::new(engine);

    let report = auditor
        .check_with(
            ScanTarget::Document,
            CheckOptions::from_json(&json!({ "includedImpacts": ["serious"] })),
            None,
        )
        .await
        .expect("minor violation is filtered out");

    assert!(report.is_clean());
    // The raw results still carry everything the engine found.
    assert_eq!(report.results.violations.len(), 1);
}

#[tokio::test]
async fn test_engine_never_sees_pipeline_keys() {
    let mut auditor = Auditor::new(ScriptedEngine::clean());
    auditor.configure_pipeline(CheckOptions::from_json(&json!({
        "retries": 2,
        "interval": 5,
        "includedImpacts": ["critical"],
        "runOnly": { "type": "tag", "values": ["wcag2aa"] }
    })));

    auditor.check().await.expect("clean scan passes");

    let seen = auditor
        .engine()
        .run_options_seen
        .lock()
        .expect("options lock")
        .clone();
    assert_eq!(
        seen,
        vec![json!({ "runOnly": { "type": "tag", "values": ["wcag2aa"] } })]
    );
}

#[tokio::test]
async fn test_selector_target_reaches_engine() {
    let auditor = Auditor::new(ScriptedEngine::clean());

    auditor
        .check_with("#main", CheckOptions::default(), None)
        .await
        .expect("clean scan passes");

    let targets = auditor
        .engine()
        .targets_seen
        .lock()
        .expect("targets lock")
        .clone();
    assert_eq!(targets, vec![ScanTarget::Selector("#main".to_string())]);
}

#[tokio::test]
async fn test_label_reaches_reporters_and_report() {
    let engine = ScriptedEngine::new(vec![results(vec![violation(
        "image-alt",
        Some(Impact::Critical),
    )])]);
    let recording = RecordingReporter::default();
    let auditor = Auditor::new(engine)
        .with_reporter(recording.clone())
        .with_defaults(CheckOptions::new().with_policy(FailurePolicy::None));

    let report = auditor
        .check_with(
            ScanTarget::Document,
            CheckOptions::default(),
            Some("checkout form"),
        )
        .await
        .expect("report-only passes");

    assert_eq!(report.label.as_deref(), Some("checkout form"));
    let records = recording.records();
    assert_eq!(records[0].label.as_deref(), Some("checkout form"));
}

#[tokio::test]
async fn test_filename_falls_back_to_source_name() {
    // No URL in the engine results, e.g. a local file scan.
    let engine = ScriptedEngine::new(vec![ScanResults {
        violations: vec![violation("image-alt", Some(Impact::Critical))],
        ..ScanResults::default()
    }]);
    let recording = RecordingReporter::default();
    let auditor = Auditor::new(engine)
        .with_reporters(vec![Box::new(recording.clone())])
        .with_source("fixtures/landing.html")
        .with_defaults(CheckOptions::new().with_policy(FailurePolicy::None));

    auditor.check().await.expect("report-only passes");

    let records = recording.records();
    assert_eq!(records[0].filename, "fixtures/landing.html");
}

#[tokio::test]
async fn test_engine_rejection_aborts_without_reporting() {
    let recording = RecordingReporter::default();
    let auditor = Auditor::new(RejectingEngine).with_reporter(recording.clone());

    let err = auditor.check().await.expect_err("engine rejection aborts");

    assert!(matches!(err, AuditError::Engine(_)));
    assert!(recording.records().is_empty());
}

#[tokio::test]
async fn test_two_violations_pluralize_message() {
    let engine = ScriptedEngine::new(vec![results(vec![
        violation("image-alt", Some(Impact::Critical)),
        violation("label", Some(Impact::Serious)),
    ])]);
    let auditor = Auditor::new(engine);

    let err = auditor.check().await.expect_err("violations fail the check");
    assert_eq!(err.to_string(), "2 accessibility violations were detected");
}
