//! `[hardware]` section: simulated joints.
//!
//! ```toml
//! [[hardware.joints]]
//! name = "shoulder"
//! interface = "position"
//! initial_position = 0.0
//! time_constant_s = 0.05
//! ```

use motus_common::hal::{CommandInterface, HalError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn default_time_constant() -> f64 {
    0.02
}

/// One simulated joint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimJointConfig {
    /// Joint name, unique within the hardware.
    pub name: String,

    /// Command interface the joint is exposed through.
    #[serde(default)]
    pub interface: CommandInterface,

    /// Position at power-up.
    #[serde(default)]
    pub initial_position: f64,

    /// First-order response time constant for position joints [s].
    #[serde(default = "default_time_constant")]
    pub time_constant_s: f64,

    /// Lower travel limit.
    #[serde(default)]
    pub min_position: Option<f64>,

    /// Upper travel limit.
    #[serde(default)]
    pub max_position: Option<f64>,
}

impl SimJointConfig {
    /// Position joint at `initial_position` with default dynamics.
    pub fn position(name: impl Into<String>, initial_position: f64) -> Self {
        Self {
            name: name.into(),
            interface: CommandInterface::Position,
            initial_position,
            time_constant_s: default_time_constant(),
            min_position: None,
            max_position: None,
        }
    }
}

/// Simulated hardware description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HardwareConfig {
    /// Joints in registration order.
    #[serde(default)]
    pub joints: Vec<SimJointConfig>,
}

impl HardwareConfig {
    /// Check names, dynamics and limits.
    pub fn validate(&self) -> Result<(), HalError> {
        let mut names = HashSet::new();
        for joint in &self.joints {
            if joint.name.is_empty() {
                return Err(HalError::ConfigError("joint name cannot be empty".to_string()));
            }
            if !names.insert(joint.name.as_str()) {
                return Err(HalError::DuplicateJoint(joint.name.clone()));
            }
            if !joint.initial_position.is_finite() {
                return Err(HalError::ConfigError(format!(
                    "joint '{}': initial_position must be finite, got {}",
                    joint.name, joint.initial_position
                )));
            }
            if !(joint.time_constant_s >= 0.0 && joint.time_constant_s.is_finite()) {
                return Err(HalError::ConfigError(format!(
                    "joint '{}': time_constant_s must be finite and >= 0, got {}",
                    joint.name, joint.time_constant_s
                )));
            }
            let limits = [
                ("min_position", joint.min_position),
                ("max_position", joint.max_position),
            ];
            for (key, limit) in limits {
                if limit.is_some_and(|v| !v.is_finite()) {
                    return Err(HalError::ConfigError(format!(
                        "joint '{}': {key} must be finite (omit it for no limit)",
                        joint.name
                    )));
                }
            }
            if let (Some(min), Some(max)) = (joint.min_position, joint.max_position) {
                if min > max {
                    return Err(HalError::ConfigError(format!(
                        "joint '{}': min_position {min} > max_position {max}",
                        joint.name
                    )));
                }
            }
        }
        Ok(())
    }
}
