//! Workspace-wide constants.

use std::time::Duration;

/// Maximum number of actuators a single controller can claim.
///
/// Bounds the fixed-capacity claimed set so the Update tick never allocates.
pub const MAX_ACTUATORS: usize = 64;

/// Default control cycle time in microseconds (1 kHz).
pub const DEFAULT_CYCLE_TIME_US: u32 = 1000;

/// Default control cycle time as Duration.
pub const DEFAULT_CYCLE_TIME: Duration = Duration::from_micros(DEFAULT_CYCLE_TIME_US as u64);

/// Default bound on the interpreter bootstrap handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 5000;

/// Default namespace the interpreter is bound to.
pub const DEFAULT_NAMESPACE: &str = "motus_controller";

/// Default parameter key holding the ordered actuator name list.
pub const DEFAULT_PARAMETER_KEY: &str = "actuator_map";

/// Default startup transcript location. Truncated on every controller construction.
pub const DEFAULT_TRANSCRIPT_PATH: &str = "/tmp/motus_controller.out";

/// Environment variable supplying the interpreter search path.
pub const DEFAULT_PATH_ENV: &str = "PYTHONPATH";

/// Process identity argument handed to the interpreter.
pub const DEFAULT_IDENTITY: &str = "motus";

/// Startup module imported as the last startup command.
pub const DEFAULT_STARTUP_MODULE: &str = "startup";
