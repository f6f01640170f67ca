//! The seam between the check pipeline and an injected accessibility engine.
//!
//! The engine is an external collaborator with exactly two entry points:
//! `configure` and `run`. The browser crate provides the production
//! implementation over CDP; tests provide scripted stand-ins.

use crate::error::EngineResult;
use crate::types::{ScanResults, ScanTarget};
use serde_json::Value;

/// Handle to an engine that has been injected into a document.
///
/// A value implementing this trait is the capability to scan: it is
/// produced by the injector once per navigation and threaded into the
/// scan runner explicitly, so nothing in the pipeline relies on ambient
/// global state.
#[async_trait::async_trait]
pub trait ScanEngine: Send + Sync {
    /// Forward an engine-specific configuration object (rule tweaks,
    /// locale, custom checks) verbatim to the engine.
    async fn configure(&self, spec: &Value) -> EngineResult<()>;

    /// Execute one scan of `target` with the given run options.
    ///
    /// `run_options` is opaque to the pipeline and forwarded verbatim;
    /// pipeline-owned keys have already been stripped by the caller.
    /// A rejection maps to [`EngineError::Invocation`] and is fatal for
    /// the current check call.
    ///
    /// [`EngineError::Invocation`]: crate::error::EngineError::Invocation
    async fn run(&self, target: &ScanTarget, run_options: &Value) -> EngineResult<ScanResults>;
}
