//! Configuration management for Halberd.
//!
//! Provides TOML-based configuration with environment variable overrides.
//! The config file is project-local (`halberd.toml` in the working
//! directory) because audit settings belong to the repository under test,
//! not to the user's home directory.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "halberd.toml";

/// Main audit configuration.
///
/// Loaded from `halberd.toml`. If the file doesn't exist, default values
/// are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Engine bundle settings
    pub engine: EngineConfig,
    /// Check pipeline defaults
    pub check: CheckConfig,
    /// Browser session settings
    pub browser: BrowserConfig,
}

impl AuditConfig {
    /// Load configuration from `halberd.toml`, falling back to defaults if
    /// the file is not present.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> ConfigResult<Self> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            Self::load_from(path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// Unlike [`AuditConfig::load`], a missing file is an error here: the
    /// caller asked for this file specifically.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `HALBERD_RETRIES`: override the retry budget
    /// - `HALBERD_REPORT_ONLY`: override report-only mode (true/false)
    /// - `HALBERD_HEADLESS`: override browser headless mode (true/false)
    /// - `HALBERD_ENGINE_PATH`: override the engine bundle path
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    // Unparseable values are ignored, keeping the configured ones.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HALBERD_RETRIES") {
            if let Ok(retries) = val.parse() {
                self.check.retries = retries;
                tracing::debug!("Override check.retries from env: {}", retries);
            }
        }

        if let Ok(val) = std::env::var("HALBERD_REPORT_ONLY") {
            if let Ok(report_only) = val.parse() {
                self.check.report_only = report_only;
                tracing::debug!("Override check.report_only from env: {}", report_only);
            }
        }

        if let Ok(val) = std::env::var("HALBERD_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Ok(val) = std::env::var("HALBERD_ENGINE_PATH") {
            self.engine.source_path = Some(PathBuf::from(&val));
            tracing::debug!("Override engine.source_path from env: {}", val);
        }
    }

    /// Save configuration to the given path, creating parent directories
    /// as needed.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

/// Engine bundle settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the engine source bundle. When unset, the injector falls
    /// back to the conventional `node_modules` location.
    pub source_path: Option<PathBuf>,
}

/// Check pipeline defaults.
///
/// These translate into the pipeline's default check options; call-site
/// overrides take precedence per field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Number of re-scans allowed while violations persist (0 = scan once)
    pub retries: u32,
    /// Delay between re-scans in milliseconds
    pub interval_ms: u64,
    /// Impact labels a violation must match to be considered; empty means
    /// no filtering. A list containing an unrecognized label disables
    /// filtering entirely (lenient parsing).
    pub included_impacts: Vec<String>,
    /// Impact labels that fail the run; empty means any violation fails
    pub fail_on: Vec<String>,
    /// Surface violations without failing the run
    pub report_only: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            retries: 0,
            interval_ms: 1000,
            included_impacts: Vec::new(),
            fail_on: Vec::new(),
            report_only: false,
        }
    }
}

/// Browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run the browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AuditConfig::default();
        assert_eq!(config.check.retries, 0);
        assert_eq!(config.check.interval_ms, 1000);
        assert!(config.check.included_impacts.is_empty());
        assert!(!config.check.report_only);
        assert!(config.browser.headless);
        assert!(config.engine.source_path.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = AuditConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[engine]"));
        assert!(toml_str.contains("[check]"));
        assert!(toml_str.contains("[browser]"));

        let parsed: AuditConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.check.interval_ms, config.check.interval_ms);
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("halberd.toml");

        let mut config = AuditConfig::default();
        config.check.retries = 3;
        config.check.included_impacts = vec!["serious".to_string(), "critical".to_string()];
        config.engine.source_path = Some(PathBuf::from("vendor/axe.min.js"));

        config.save_to(&config_path).expect("save config");

        let loaded = AuditConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.check.retries, 3);
        assert_eq!(loaded.check.included_impacts.len(), 2);
        assert_eq!(
            loaded.engine.source_path,
            Some(PathBuf::from("vendor/axe.min.js"))
        );
    }

    #[test]
    fn test_load_from_missing_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let missing = tmp.path().join("nope.toml");
        let err = AuditConfig::load_from(&missing).expect_err("missing file should error");
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[check]
retries = 2
report_only = true
"#;

        let config: AuditConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.check.retries, 2);
        assert!(config.check.report_only);
        // These should be defaults
        assert_eq!(config.check.interval_ms, 1000);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_env_overrides() {
        // load_with_env reads the real working directory; drive the
        // override step it delegates to directly. Single test for all
        // HALBERD_* variables since the environment is process-global.
        std::env::set_var("HALBERD_RETRIES", "5");
        std::env::set_var("HALBERD_REPORT_ONLY", "true");
        std::env::set_var("HALBERD_HEADLESS", "false");
        std::env::set_var("HALBERD_ENGINE_PATH", "custom/axe.js");

        let mut config = AuditConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.check.retries, 5);
        assert!(config.check.report_only);
        assert!(!config.browser.headless);
        assert_eq!(config.engine.source_path, Some(PathBuf::from("custom/axe.js")));

        // Unparseable values keep the configured ones.
        std::env::set_var("HALBERD_RETRIES", "many");
        std::env::set_var("HALBERD_HEADLESS", "sometimes");
        let mut config = AuditConfig::default();
        config.check.retries = 2;
        config.apply_env_overrides();
        assert_eq!(config.check.retries, 2);
        assert!(config.browser.headless);

        std::env::remove_var("HALBERD_RETRIES");
        std::env::remove_var("HALBERD_REPORT_ONLY");
        std::env::remove_var("HALBERD_HEADLESS");
        std::env::remove_var("HALBERD_ENGINE_PATH");
    }
}
