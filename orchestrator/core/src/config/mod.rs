//! TOML Configuration File Support
//!
//! Loads orchestrator settings from
//! `$XDG_CONFIG_HOME/avatar-orchestrator/orchestrator.toml`.
//!
//! # Configuration Priority
//!
//! Highest first:
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [layout]
//! mobile_max = 600.0
//! tablet_max = 1200.0
//!
//! [fault]
//! forward_to_previous_hook = true
//! capture_backtrace = true
//! ```
//!
//! # Environment Variables
//!
//! - `ORCHESTRATOR_MOBILE_MAX`: mobile breakpoint (logical pixels)
//! - `ORCHESTRATOR_TABLET_MAX`: tablet breakpoint (logical pixels)
//! - `ORCHESTRATOR_FORWARD_PANICS`: `0`/`false` silences the default panic report

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fault::CaptureConfig;
use crate::layout::BreakpointSet;

const ENV_MOBILE_MAX: &str = "ORCHESTRATOR_MOBILE_MAX";
const ENV_TABLET_MAX: &str = "ORCHESTRATOR_TABLET_MAX";
const ENV_FORWARD_PANICS: &str = "ORCHESTRATOR_FORWARD_PANICS";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Layout section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutToml {
    /// Upper bound (exclusive) of the mobile layout
    pub mobile_max: Option<f64>,

    /// Upper bound (exclusive) of the tablet layout
    pub tablet_max: Option<f64>,
}

/// Fault capture section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultToml {
    /// Chain to the previously installed panic hook
    pub forward_to_previous_hook: Option<bool>,

    /// Capture backtraces for faults
    pub capture_backtrace: Option<bool>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorToml {
    /// Layout configuration section
    pub layout: LayoutToml,

    /// Fault capture configuration section
    pub fault: FaultToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved orchestrator configuration
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Layout breakpoints (validated)
    pub breakpoints: BreakpointSet,

    /// Panic hook behaviour
    pub capture: CaptureConfig,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Highest-priority source that contributed a value
    source: ConfigSource,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            breakpoints: BreakpointSet::default(),
            capture: CaptureConfig::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl OrchestratorConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }
}

/// Thresholds collected from every source before validation
#[derive(Clone, Copy, Debug)]
struct PendingLayout {
    mobile_max: f64,
    tablet_max: f64,
}

impl PendingLayout {
    fn from_set(set: BreakpointSet) -> Self {
        Self {
            mobile_max: set.mobile_max(),
            tablet_max: set.tablet_max(),
        }
    }

    fn build(self) -> Result<BreakpointSet, ConfigError> {
        BreakpointSet::new(self.mobile_max, self.tablet_max)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/avatar-orchestrator/orchestrator.toml`, or
/// `None` when no config directory is known.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("avatar-orchestrator").join("orchestrator.toml"))
}

/// Load configuration from every source with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed,
/// or if the resulting breakpoints are invalid. A missing config file is not
/// an error.
pub fn load_config(overrides: &ConfigOverrides) -> Result<OrchestratorConfig, ConfigError> {
    load_config_from_path(default_config_path().as_deref(), overrides)
}

/// Load configuration from a specific path
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_from_path(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<OrchestratorConfig, ConfigError> {
    load_with_env(path, overrides, |key| std::env::var(key).ok())
}

fn load_with_env<F>(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
    env: F,
) -> Result<OrchestratorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = OrchestratorConfig::default();
    let mut layout = PendingLayout::from_set(config.breakpoints);

    if let Some(config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.to_path_buf(),
                    source: e,
                })?;

            let toml_config: OrchestratorToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &mut layout, &toml_config);
            config.config_file_path = Some(config_path.to_path_buf());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, &mut layout, &env);
    overrides.apply_pending(&mut config, &mut layout);

    config.breakpoints = layout.build()?;
    Ok(config)
}

fn apply_toml_config(
    config: &mut OrchestratorConfig,
    layout: &mut PendingLayout,
    toml: &OrchestratorToml,
) {
    if let Some(mobile_max) = toml.layout.mobile_max {
        layout.mobile_max = mobile_max;
    }
    if let Some(tablet_max) = toml.layout.tablet_max {
        layout.tablet_max = tablet_max;
    }
    if let Some(forward) = toml.fault.forward_to_previous_hook {
        config.capture.forward_to_previous_hook = forward;
    }
    if let Some(capture) = toml.fault.capture_backtrace {
        config.capture.capture_backtrace = capture;
    }
}

fn apply_env_config<F>(config: &mut OrchestratorConfig, layout: &mut PendingLayout, env: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = env(ENV_MOBILE_MAX) {
        if let Ok(px) = value.parse::<f64>() {
            layout.mobile_max = px;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(value) = env(ENV_TABLET_MAX) {
        if let Ok(px) = value.parse::<f64>() {
            layout.tablet_max = px;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(value) = env(ENV_FORWARD_PANICS) {
        config.capture.forward_to_previous_hook = value != "0" && value.to_lowercase() != "false";
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Command-line overrides, applied last
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Mobile breakpoint override
    pub mobile_max: Option<f64>,

    /// Tablet breakpoint override
    pub tablet_max: Option<f64>,

    /// Panic forwarding override
    pub forward_to_previous_hook: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set mobile breakpoint override
    #[must_use]
    pub fn with_mobile_max(mut self, px: f64) -> Self {
        self.mobile_max = Some(px);
        self
    }

    /// Set tablet breakpoint override
    #[must_use]
    pub fn with_tablet_max(mut self, px: f64) -> Self {
        self.tablet_max = Some(px);
        self
    }

    /// Set panic forwarding override
    #[must_use]
    pub fn with_forward_to_previous_hook(mut self, forward: bool) -> Self {
        self.forward_to_previous_hook = Some(forward);
        self
    }

    fn is_empty(&self) -> bool {
        self.mobile_max.is_none()
            && self.tablet_max.is_none()
            && self.forward_to_previous_hook.is_none()
    }

    fn apply_pending(&self, config: &mut OrchestratorConfig, layout: &mut PendingLayout) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }
        if let Some(px) = self.mobile_max {
            layout.mobile_max = px;
        }
        if let Some(px) = self.tablet_max {
            layout.tablet_max = px;
        }
        if let Some(forward) = self.forward_to_previous_hook {
            config.capture.forward_to_previous_hook = forward;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
