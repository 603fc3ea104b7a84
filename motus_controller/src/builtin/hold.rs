//! Hold-position control law.
//!
//! Captures the measured positions at Starting and commands them every tick.
//! Measurements outside `[min_position, max_position]` are clamped before
//! being held and reported as an alignment fault.

use motus_common::device::{AlignmentError, ControlLaw, DeviceError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

fn default_min() -> f64 {
    -std::f64::consts::PI
}

fn default_max() -> f64 {
    std::f64::consts::PI
}

/// `[device]` section.
///
/// ```toml
/// [device]
/// min_position = -3.14
/// max_position = 3.14
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HoldDeviceConfig {
    /// Lowest position the device will command.
    #[serde(default = "default_min")]
    pub min_position: f64,

    /// Highest position the device will command.
    #[serde(default = "default_max")]
    pub max_position: f64,
}

impl Default for HoldDeviceConfig {
    fn default() -> Self {
        Self {
            min_position: default_min(),
            max_position: default_max(),
        }
    }
}

impl HoldDeviceConfig {
    /// Limits must be finite and ordered.
    pub fn validate(&self) -> Result<(), String> {
        if !self.min_position.is_finite() || !self.max_position.is_finite() {
            return Err("device limits must be finite".to_string());
        }
        if self.min_position >= self.max_position {
            return Err(format!(
                "device min_position {} must be below max_position {}",
                self.min_position, self.max_position
            ));
        }
        Ok(())
    }
}

/// Holds every actuator where it was at Starting.
#[derive(Debug, Clone)]
pub struct HoldPosition {
    config: HoldDeviceConfig,
    targets: Vec<f64>,
    elapsed: Duration,
}

impl HoldPosition {
    /// Device with the given limits.
    pub fn new(config: HoldDeviceConfig) -> Self {
        Self {
            config,
            targets: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Currently held targets.
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Total time advanced through `step`.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl ControlLaw for HoldPosition {
    fn name(&self) -> &str {
        "hold_position"
    }

    fn init(&mut self) -> Result<(), DeviceError> {
        self.config.validate().map_err(DeviceError::InitFailed)?;
        info!(
            "Hold-position device limits [{}, {}]",
            self.config.min_position, self.config.max_position
        );
        Ok(())
    }

    fn align_state(&mut self, measured: &[f64]) -> Result<(), AlignmentError> {
        let HoldDeviceConfig {
            min_position: min,
            max_position: max,
        } = self.config;
        self.targets.clear();
        self.targets.extend(measured.iter().map(|p| p.clamp(min, max)));
        debug!("Holding {:?}", self.targets);

        match measured.iter().position(|p| !(min..=max).contains(p)) {
            Some(index) => Err(AlignmentError::OutOfRange {
                index,
                value: measured[index],
                min,
                max,
            }),
            None => Ok(()),
        }
    }

    fn step(&mut self, elapsed: Duration) -> &[f64] {
        self.elapsed += elapsed;
        &self.targets
    }
}
