//! Simulated hardware.
//!
//! Each joint follows its command with simple dynamics:
//! - Position: first-order lag towards the commanded position
//! - Velocity: integrates the commanded velocity
//! - Effort: holds position, reports the commanded effort
//!
//! Positions are clamped to the configured travel limits.

use crate::config::{HardwareConfig, SimJointConfig};
use crate::registry::JointRegistry;
use motus_common::hal::{CommandInterface, HalError, JointState, ResourceDirectory, RobotHardware};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Physics state of one joint.
struct SimJoint {
    interface: CommandInterface,
    cell: Arc<JointState>,
    position: f64,
    velocity: f64,
    effort: f64,
    time_constant_s: f64,
    min_position: f64,
    max_position: f64,
    /// Command sequence seen on the previous write.
    last_seq: u64,
}

impl SimJoint {
    fn new(config: &SimJointConfig, cell: Arc<JointState>) -> Self {
        Self {
            interface: config.interface,
            cell,
            position: config.initial_position,
            velocity: 0.0,
            effort: 0.0,
            time_constant_s: config.time_constant_s,
            min_position: config.min_position.unwrap_or(f64::NEG_INFINITY),
            max_position: config.max_position.unwrap_or(f64::INFINITY),
            last_seq: 0,
        }
    }

    fn integrate(&mut self, dt: f64) {
        let command = self.cell.command();
        let seq = self.cell.command_seq();
        let fresh = seq != self.last_seq;
        self.last_seq = seq;

        let previous = self.position;
        match self.interface {
            CommandInterface::Position => {
                let alpha = if self.time_constant_s > 0.0 {
                    dt / (self.time_constant_s + dt)
                } else {
                    1.0
                };
                self.position += (command - self.position) * alpha;
            }
            CommandInterface::Velocity => {
                // A stale velocity command must not keep the joint moving.
                if fresh {
                    self.position += command * dt;
                }
            }
            CommandInterface::Effort => {
                self.effort = if fresh { command } else { 0.0 };
            }
        }
        self.position = self.position.clamp(self.min_position, self.max_position);
        self.velocity = if dt > 0.0 {
            (self.position - previous) / dt
        } else {
            0.0
        };
    }
}

/// Simulated robot backed by a [`JointRegistry`].
pub struct SimulatedHardware {
    registry: JointRegistry,
    joints: Vec<SimJoint>,
}

impl SimulatedHardware {
    /// Build the registry and physics state from configuration.
    ///
    /// # Errors
    /// Returns `HalError` if the configuration is invalid.
    pub fn from_config(config: &HardwareConfig) -> Result<Self, HalError> {
        config.validate()?;

        let mut registry = JointRegistry::new();
        let mut joints = Vec::with_capacity(config.joints.len());
        for joint in &config.joints {
            let cell = registry.register(&joint.name, joint.interface, joint.initial_position)?;
            joints.push(SimJoint::new(joint, cell));
        }

        info!("Simulated hardware with {} joints: {:?}", joints.len(), registry.names());
        Ok(Self { registry, joints })
    }

    /// Underlying registry.
    pub fn registry(&self) -> &JointRegistry {
        &self.registry
    }
}

impl RobotHardware for SimulatedHardware {
    fn read(&mut self, _period: Duration) {
        for joint in &self.joints {
            joint.cell.publish(joint.position, joint.velocity, joint.effort);
        }
    }

    fn write(&mut self, period: Duration) {
        let dt = period.as_secs_f64();
        for joint in &mut self.joints {
            joint.integrate(dt);
        }
    }

    fn directory(&self) -> &dyn ResourceDirectory {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: Duration = Duration::from_millis(1);

    fn hardware(joints: Vec<SimJointConfig>) -> SimulatedHardware {
        SimulatedHardware::from_config(&HardwareConfig { joints }).unwrap()
    }

    #[test]
    fn read_publishes_initial_position() {
        let mut hw = hardware(vec![SimJointConfig::position("shoulder", 0.7)]);
        hw.read(DT);
        let handle = hw
            .directory()
            .lookup("shoulder", CommandInterface::Position)
            .unwrap();
        assert_eq!(handle.position(), 0.7);
    }

    #[test]
    fn position_joint_converges_to_command() {
        let mut hw = hardware(vec![SimJointConfig::position("elbow", 0.0)]);
        let handle = hw
            .directory()
            .lookup("elbow", CommandInterface::Position)
            .unwrap();

        for _ in 0..500 {
            hw.read(DT);
            handle.set_command(1.0);
            hw.write(DT);
        }
        hw.read(DT);
        assert!((handle.position() - 1.0).abs() < 1e-3, "got {}", handle.position());
    }

    #[test]
    fn zero_time_constant_tracks_immediately() {
        let mut joint = SimJointConfig::position("wrist", 0.0);
        joint.time_constant_s = 0.0;
        let mut hw = hardware(vec![joint]);
        let handle = hw
            .directory()
            .lookup("wrist", CommandInterface::Position)
            .unwrap();

        handle.set_command(0.4);
        hw.write(DT);
        hw.read(DT);
        assert_eq!(handle.position(), 0.4);
    }

    #[test]
    fn velocity_joint_stops_on_stale_command() {
        let mut joint = SimJointConfig::position("wheel", 0.0);
        joint.interface = CommandInterface::Velocity;
        let mut hw = hardware(vec![joint]);
        let handle = hw
            .directory()
            .lookup("wheel", CommandInterface::Velocity)
            .unwrap();

        handle.set_command(2.0);
        hw.write(Duration::from_millis(100));
        hw.write(Duration::from_millis(100));
        hw.read(DT);
        assert!((handle.position() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn travel_limits_clamp_position() {
        let mut joint = SimJointConfig::position("knee", 0.0);
        joint.time_constant_s = 0.0;
        joint.max_position = Some(0.5);
        let mut hw = hardware(vec![joint]);
        let handle = hw
            .directory()
            .lookup("knee", CommandInterface::Position)
            .unwrap();

        handle.set_command(3.0);
        hw.write(DT);
        hw.read(DT);
        assert_eq!(handle.position(), 0.5);
    }

    #[test]
    fn nan_travel_limit_is_refused_before_the_write_path() {
        let mut joint = SimJointConfig::position("shoulder", 0.0);
        joint.min_position = Some(f64::NAN);
        let err = SimulatedHardware::from_config(&HardwareConfig { joints: vec![joint] });
        assert!(matches!(err, Err(HalError::ConfigError(_))));
    }
}
