//! Engine bundle sources.
//!
//! The scan engine is a JavaScript bundle evaluated inside the page. The
//! bundle can come from a file on disk or be handed over inline (useful
//! when the caller embeds it or fetches it itself).

use halberd_core::{EngineConfig, EngineError, EngineResult};
use std::path::{Path, PathBuf};

/// Conventional bundle location when nothing else is configured.
pub const DEFAULT_SOURCE_PATH: &str = "node_modules/axe-core/axe.min.js";

/// Where the engine bundle comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSource {
    /// Read the bundle from a file at scan time.
    Path(PathBuf),
    /// Use the given script text directly.
    Inline(String),
}

impl Default for EngineSource {
    fn default() -> Self {
        Self::Path(PathBuf::from(DEFAULT_SOURCE_PATH))
    }
}

impl EngineSource {
    /// Bundle source from a file path.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Bundle source from script text.
    pub fn inline(script: impl Into<String>) -> Self {
        Self::Inline(script.into())
    }

    /// Bundle source from engine configuration, falling back to the
    /// conventional `node_modules` location.
    pub fn from_config(config: &EngineConfig) -> Self {
        match &config.source_path {
            Some(path) => Self::Path(path.clone()),
            None => Self::default(),
        }
    }

    /// Produce the script text.
    ///
    /// # Errors
    /// Returns [`EngineError::ResourceUnavailable`] when a file source
    /// cannot be read.
    pub async fn resolve(&self) -> EngineResult<String> {
        match self {
            Self::Path(path) => read_bundle(path).await,
            Self::Inline(script) => Ok(script.clone()),
        }
    }
}

async fn read_bundle(path: &Path) -> EngineResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| EngineError::ResourceUnavailable(format!("{}: {}", path.display(), e)))
}
