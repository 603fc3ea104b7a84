//! Prelude module for common re-exports.
//!
//! ```rust
//! use motus_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_CYCLE_TIME, MAX_ACTUATORS};

// ─── Hardware ───────────────────────────────────────────────────────
pub use crate::hal::{
    CommandInterface, HalError, JointHandle, JointState, LookupError, ResourceDirectory,
    RobotHardware,
};

// ─── Capabilities ───────────────────────────────────────────────────
pub use crate::device::{AlignmentError, ControlLaw, DeviceError};
pub use crate::lifecycle::LifecyclePhase;
pub use crate::params::ParameterSource;
pub use crate::script::{
    CommandOutput, Interpreter, InterpreterError, InterpreterFactory, ResultToken,
};
