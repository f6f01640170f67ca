//! Halberd Core - Foundation crate for the Halberd accessibility auditor.
//!
//! This crate provides the shared data model, error handling, configuration
//! management, and the engine seam that the other Halberd crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with env overrides
//! - [`types`] - Shared scan data model (`Impact`, `Violation`, `ScanResults`, `ScanTarget`)
//! - [`engine`] - The [`ScanEngine`] trait implemented by engine backends
//!
//! # Example
//!
//! ```rust
//! use halberd_core::{AuditConfig, Impact, ScanTarget};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration
//! let config = AuditConfig::default();
//! assert_eq!(config.check.retries, 0);
//!
//! // Impacts order by severity
//! assert!(Impact::Critical > Impact::Minor);
//!
//! // Scan targets normalize loose JSON values
//! let target = ScanTarget::from("main .content");
//! assert_ne!(target, ScanTarget::Document);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod engine;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AuditConfig, BrowserConfig, CheckConfig, EngineConfig};
pub use engine::ScanEngine;
pub use error::{ConfigError, ConfigResult, EngineError, EngineResult};
pub use types::{
    EngineInfo, Impact, NodeSelector, ScanResults, ScanTarget, Violation, ViolationNode,
};
