//! Scan execution with bounded retry.
//!
//! Pages mutate after load: late hydration, animations, content that only
//! settles after a few frames. A single scan taken too early reports
//! violations that vanish a moment later. The runner absorbs those timing
//! races by re-scanning, after a configurable delay, for as long as
//! relevant violations persist and the retry budget allows.
//!
//! Scans run strictly in sequence. The runner never decides pass or fail,
//! it only produces the settled outcome for the gate to judge.

use crate::options::EffectiveConfig;
use halberd_core::{EngineResult, ScanEngine, ScanResults, ScanTarget, Violation};

/// What a settled scan produced.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Full results of the final scan, unfiltered.
    pub raw: ScanResults,
    /// Violations that survived the impact filter.
    pub filtered: Vec<Violation>,
    /// How many scans ran, including the first.
    pub attempts: u32,
}

/// Scan `target` until no relevant violations remain or the retry budget
/// runs out, whichever comes first.
///
/// Relevant means surviving the impact filter: a check that only cares
/// about serious violations converges as soon as the serious ones clear,
/// even while minor ones persist. With `retries` set to `r`, violations
/// that clear after `k` re-scans cost `k + 1` attempts for `k <= r`, and
/// a run that never clears costs `r + 1` attempts and keeps the final
/// scan's results.
///
/// # Errors
///
/// An engine rejection is returned immediately and never retried. The
/// retry budget exists for pages that legitimately change, not for a
/// broken engine.
pub async fn run_scan<E>(
    engine: &E,
    target: &ScanTarget,
    config: &EffectiveConfig,
) -> EngineResult<ScanOutcome>
where
    E: ScanEngine + ?Sized,
{
    let mut remaining = config.retries;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let raw = engine.run(target, &config.run_options).await?;
        let filtered = config.filter.apply(&raw.violations);

        if filtered.is_empty() || remaining == 0 {
            tracing::debug!(
                attempts,
                violations = raw.violations.len(),
                relevant = filtered.len(),
                "scan settled"
            );
            return Ok(ScanOutcome {
                raw,
                filtered,
                attempts,
            });
        }

        remaining -= 1;
        tracing::debug!(
            attempt = attempts,
            relevant = filtered.len(),
            remaining_retries = remaining,
            delay = ?config.interval,
            "relevant violations persist, scheduling re-scan"
        );
        tokio::time::sleep(config.interval).await;
    }
}
