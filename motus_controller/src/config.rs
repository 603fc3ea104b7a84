//! Controller configuration file.
//!
//! One TOML document carries every section the binary needs:
//!
//! ```toml
//! [shared]
//! service_name = "motus-controller"
//!
//! [controller]
//! namespace = "arm_controller"
//! transcript_path = "/tmp/arm_controller.out"
//!
//! [startup]
//! module = "arm_startup"
//!
//! [parameters]
//! actuator_map = ["shoulder", "elbow"]
//!
//! [[hardware.joints]]
//! name = "shoulder"
//!
//! [[hardware.joints]]
//! name = "elbow"
//! ```

use crate::builtin::HoldDeviceConfig;
use crate::controller::ControllerSettings;
use crate::script::StartupScript;
use motus_common::config::{ConfigError, ConfigLoader, SharedConfig};
use motus_common::consts::{
    DEFAULT_CYCLE_TIME_US, DEFAULT_HANDSHAKE_TIMEOUT_MS, DEFAULT_IDENTITY, DEFAULT_NAMESPACE,
    DEFAULT_PARAMETER_KEY, DEFAULT_PATH_ENV, DEFAULT_STARTUP_MODULE, DEFAULT_TRANSCRIPT_PATH,
};
use motus_common::hal::CommandInterface;
use motus_hal::HardwareConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ─── Sections ───────────────────────────────────────────────────────

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_transcript_path() -> PathBuf {
    PathBuf::from(DEFAULT_TRANSCRIPT_PATH)
}

fn default_handshake_timeout_ms() -> u64 {
    DEFAULT_HANDSHAKE_TIMEOUT_MS
}

fn default_parameter_key() -> String {
    DEFAULT_PARAMETER_KEY.to_string()
}

fn default_cycle_time_us() -> u32 {
    DEFAULT_CYCLE_TIME_US
}

/// `[controller]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerSection {
    /// Interpreter namespace.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Startup transcript file, truncated at construction.
    #[serde(default = "default_transcript_path")]
    pub transcript_path: PathBuf,

    /// Bound on the interpreter handshake [ms].
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,

    /// Parameter key of the actuator name list.
    #[serde(default = "default_parameter_key")]
    pub parameter_key: String,

    /// Interface the actuators are claimed through.
    #[serde(default)]
    pub interface: CommandInterface,

    /// Control period [µs].
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            transcript_path: default_transcript_path(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            parameter_key: default_parameter_key(),
            interface: CommandInterface::default(),
            cycle_time_us: default_cycle_time_us(),
        }
    }
}

fn default_path_env() -> String {
    DEFAULT_PATH_ENV.to_string()
}

fn default_identity() -> String {
    DEFAULT_IDENTITY.to_string()
}

fn default_module() -> String {
    DEFAULT_STARTUP_MODULE.to_string()
}

/// `[startup]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupSection {
    /// Environment variable holding extra search-path entries.
    #[serde(default = "default_path_env")]
    pub path_env: String,

    /// Process identity argument.
    #[serde(default = "default_identity")]
    pub identity: String,

    /// Module imported last.
    #[serde(default = "default_module")]
    pub module: String,

    /// Replaces the standard sequence when present.
    #[serde(default)]
    pub commands: Option<Vec<String>>,
}

impl Default for StartupSection {
    fn default() -> Self {
        Self {
            path_env: default_path_env(),
            identity: default_identity(),
            module: default_module(),
            commands: None,
        }
    }
}

impl StartupSection {
    /// Reject values that cannot be spliced into the standard commands.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.commands.is_some() {
            return Ok(());
        }
        if !is_identifier(&self.path_env) {
            return Err(ConfigError::ValidationError(format!(
                "startup.path_env '{}' is not a valid environment variable name",
                self.path_env
            )));
        }
        if self.identity.contains(['\'', '"', '\\', '\n']) {
            return Err(ConfigError::ValidationError(
                "startup.identity must not contain quotes, backslashes or newlines".to_string(),
            ));
        }
        if self.module.is_empty() || !self.module.split('.').all(is_identifier) {
            return Err(ConfigError::ValidationError(format!(
                "startup.module '{}' is not a dotted identifier",
                self.module
            )));
        }
        Ok(())
    }

    /// Command sequence this section describes.
    pub fn script(&self) -> StartupScript {
        match &self.commands {
            Some(commands) => StartupScript::from_commands(commands.iter().cloned()),
            None => StartupScript::standard(&self.path_env, &self.identity, &self.module),
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ─── Whole File ─────────────────────────────────────────────────────

/// Complete controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Common service fields.
    pub shared: SharedConfig,

    /// Controller settings.
    #[serde(default)]
    pub controller: ControllerSection,

    /// Startup script settings.
    #[serde(default)]
    pub startup: StartupSection,

    /// Parameter source handed to Init.
    #[serde(default)]
    pub parameters: toml::Table,

    /// Simulated hardware.
    #[serde(default)]
    pub hardware: HardwareConfig,

    /// Hold-position device limits.
    #[serde(default)]
    pub device: HoldDeviceConfig,
}

impl ControllerConfig {
    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        let c = &self.controller;
        if c.namespace.is_empty() || c.namespace.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "controller.namespace '{}' must be non-empty without whitespace",
                c.namespace
            )));
        }
        if c.handshake_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "controller.handshake_timeout_ms must be > 0".to_string(),
            ));
        }
        if c.cycle_time_us == 0 {
            return Err(ConfigError::ValidationError(
                "controller.cycle_time_us must be > 0".to_string(),
            ));
        }
        if c.parameter_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "controller.parameter_key cannot be empty".to_string(),
            ));
        }

        self.startup.validate()?;
        self.hardware
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        self.device.validate().map_err(ConfigError::ValidationError)?;
        Ok(())
    }

    /// Construction settings for [`crate::Controller`].
    pub fn settings(&self) -> ControllerSettings {
        ControllerSettings {
            namespace: self.controller.namespace.clone(),
            handshake_timeout: Duration::from_millis(self.controller.handshake_timeout_ms),
            parameter_key: self.controller.parameter_key.clone(),
            interface: self.controller.interface,
            startup: self.startup.script(),
            transcript_path: Some(self.controller.transcript_path.clone()),
        }
    }

    /// Control period.
    pub fn cycle_time(&self) -> Duration {
        Duration::from_micros(u64::from(self.controller.cycle_time_us))
    }
}

/// Load and validate the controller file.
pub fn load_config(path: &Path) -> Result<ControllerConfig, ConfigError> {
    let config = ControllerConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<ControllerConfig, ConfigError> {
    let config = ControllerConfig::from_toml(content)?;
    config.validate()?;
    Ok(config)
}
