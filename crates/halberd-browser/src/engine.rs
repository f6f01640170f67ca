//! Page-bound scan engine.
//!
//! [`PageEngine::inject`] evaluates the engine bundle inside a page and
//! probes for the engine global before handing back a handle. All later
//! calls go through JavaScript envelopes that never throw: the script
//! returns `{ ok: true, ... }` or `{ ok: false, error }` so that engine
//! failures decode deterministically instead of surfacing as protocol
//! exceptions.

use crate::source::EngineSource;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use halberd_core::{EngineError, EngineInfo, EngineResult, ScanEngine, ScanResults, ScanTarget};
use serde::Deserialize;
use serde_json::Value;

const ENGINE_NAME: &str = "axe-core";

const PROBE_EXPRESSION: &str = r#"(() => {
    const engine = window.axe;
    if (!engine || typeof engine.run !== 'function') {
        return { ok: false, error: 'engine global "axe" not present after injection' };
    }
    return { ok: true, version: String(engine.version || '') };
})()"#;

/// Scan engine bound to a single browser page.
///
/// Obtained through [`PageEngine::inject`], which is the only way to
/// construct one: holding a `PageEngine` means the bundle was evaluated
/// and the engine global answered the probe.
#[derive(Debug)]
pub struct PageEngine {
    page: Page,
    info: EngineInfo,
}

impl PageEngine {
    /// Evaluate the engine bundle in `page` and verify the engine global.
    ///
    /// Injecting into a page that already carries the engine simply
    /// re-evaluates the bundle; callers re-inject after each navigation.
    ///
    /// # Errors
    /// Returns [`EngineError::ResourceUnavailable`] when the bundle cannot
    /// be read or evaluated, or when the engine global does not answer the
    /// probe afterwards.
    pub async fn inject(page: Page, source: &EngineSource) -> EngineResult<Self> {
        let script = source.resolve().await?;
        page.evaluate(script)
            .await
            .map_err(|e| EngineError::ResourceUnavailable(format!("bundle evaluation failed: {e}")))?;

        let probe: ProbeEnvelope = eval_envelope(&page, PROBE_EXPRESSION.to_string()).await?;
        let info = probe_outcome(probe)?;
        tracing::info!(engine = %info.name, version = %info.version, "engine injected");

        Ok(Self { page, info })
    }

    /// Name and version reported by the injected engine.
    pub fn info(&self) -> &EngineInfo {
        &self.info
    }

    /// The underlying page handle.
    pub fn page(&self) -> &Page {
        &self.page
    }
}

#[async_trait::async_trait]
impl ScanEngine for PageEngine {
    async fn configure(&self, spec: &Value) -> EngineResult<()> {
        let ack: AckEnvelope = eval_envelope(&self.page, configure_expression(spec)).await?;
        if ack.ok {
            tracing::debug!("engine configured");
            Ok(())
        } else {
            Err(EngineError::Invocation(
                ack.error
                    .unwrap_or_else(|| "engine configure failed".to_string()),
            ))
        }
    }

    async fn run(&self, target: &ScanTarget, run_options: &Value) -> EngineResult<ScanResults> {
        match target {
            ScanTarget::Document => tracing::debug!("scanning full document"),
            ScanTarget::Selector(sel) => tracing::debug!(selector = %sel, "scanning selector"),
        }

        let outcome: RunEnvelope =
            eval_envelope(&self.page, run_expression(target, run_options)).await?;
        if !outcome.ok {
            return Err(EngineError::Invocation(
                outcome
                    .error
                    .unwrap_or_else(|| "engine run failed".to_string()),
            ));
        }
        outcome
            .results
            .ok_or_else(|| EngineError::Invocation("engine returned no results".to_string()))
    }
}

async fn eval_envelope<T>(page: &Page, expression: String) -> EngineResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let params = EvaluateParams::builder()
        .expression(expression)
        .await_promise(true)
        .return_by_value(true)
        .build()
        .map_err(EngineError::Invocation)?;

    let evaluation = page
        .evaluate(params)
        .await
        .map_err(|e| EngineError::Invocation(e.to_string()))?;

    evaluation
        .into_value()
        .map_err(|e| EngineError::Invocation(format!("malformed engine response: {e}")))
}

fn configure_expression(spec: &Value) -> String {
    envelope(&format!("window.axe.configure({spec}); return {{ ok: true }};"))
}

fn run_expression(target: &ScanTarget, run_options: &Value) -> String {
    // axe.run accepts a selector string as context; absent context means
    // the whole document.
    let context = match target {
        ScanTarget::Document => "document".to_string(),
        ScanTarget::Selector(sel) => Value::String(sel.clone()).to_string(),
    };
    envelope(&format!(
        "const results = await window.axe.run({context}, {run_options}); \
         return {{ ok: true, results: JSON.parse(JSON.stringify(results)) }};"
    ))
}

fn envelope(body: &str) -> String {
    format!(
        "(async () => {{ try {{ {body} }} \
         catch (err) {{ return {{ ok: false, error: err && err.message ? err.message : String(err) }}; }} }})()"
    )
}

// A bundle that evaluates without yielding the engine global is an
// unusable source, not an engine rejection.
fn probe_outcome(probe: ProbeEnvelope) -> EngineResult<EngineInfo> {
    if probe.ok {
        Ok(EngineInfo {
            name: ENGINE_NAME.to_string(),
            version: probe.version,
        })
    } else {
        Err(EngineError::ResourceUnavailable(probe.error.unwrap_or_else(
            || "engine global not present after injection".to_string(),
        )))
    }
}

#[derive(Debug, Deserialize)]
struct ProbeEnvelope {
    ok: bool,
    #[serde(default)]
    version: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AckEnvelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunEnvelope {
    ok: bool,
    #[serde(default)]
    results: Option<ScanResults>,
    #[serde(default)]
    error: Option<String>,
}
