//! Core error types for the Halberd workspace.
//!
//! Two failure classes abort a check before it produces any result:
//! the engine bundle could not be loaded, or the injected engine rejected
//! an invocation. Everything downstream of a successful scan (filtering,
//! reporting, the final assertion) never surfaces through these types.

use thiserror::Error;

/// Errors raised by an accessibility engine implementation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine source bundle could not be read or evaluated, or did
    /// not yield a working engine global when injected.
    /// No scan may proceed until injection is retried.
    #[error("engine source unavailable: {0}")]
    ResourceUnavailable(String),

    /// The injected engine rejected a `configure` or `run` call
    /// (engine missing from the document, invalid target, engine throw).
    /// Never retried by the scan loop.
    #[error("engine invocation failed: {0}")]
    Invocation(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where the config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
