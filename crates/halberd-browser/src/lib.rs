//! Browser host for the Halberd scan engine.
//!
//! Provides headless Chromium sessions, engine bundle injection,
//! and a page-bound [`halberd_core::ScanEngine`] implementation.

pub mod engine;
pub mod error;
pub mod session;
pub mod source;

pub use engine::PageEngine;
pub use error::{BrowserError, Result};
pub use session::BrowserSession;
pub use source::{EngineSource, DEFAULT_SOURCE_PATH};
