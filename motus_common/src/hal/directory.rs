//! Resource directory capability and the hardware cycle trait.

use crate::hal::joint::{CommandInterface, JointHandle};
use std::time::Duration;
use thiserror::Error;

/// Why a named lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No joint registered under that name.
    #[error("joint '{name}' not found")]
    NotFound {
        /// Requested name.
        name: String,
    },

    /// Joint exists but is exposed through another command interface.
    #[error("joint '{name}' is exposed as {actual}, not {requested}")]
    WrongInterface {
        /// Requested name.
        name: String,
        /// Interface the caller asked for.
        requested: CommandInterface,
        /// Interface the joint is registered under.
        actual: CommandInterface,
    },
}

/// Error types for hardware backends.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// Backend configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A joint name was registered twice
    #[error("Duplicate joint: {0}")]
    DuplicateJoint(String),
}

/// Named lookup of joint handles.
///
/// Implementors own the joint cells; a lookup hands out a new handle to an
/// existing cell and never creates hardware. Lookups may block and are only
/// performed outside the control tick.
pub trait ResourceDirectory {
    /// Resolve `name` for commanding through `interface`.
    fn lookup(&self, name: &str, interface: CommandInterface) -> Result<JointHandle, LookupError>;

    /// Names currently registered, in registration order.
    fn names(&self) -> Vec<String>;
}

/// A hardware backend driven by the cycle runner.
///
/// # Timing Contracts
///
/// | Operation | RT Constraint |
/// |-----------|---------------|
/// | `read()`  | **HARD**      |
/// | `write()` | **HARD**      |
pub trait RobotHardware {
    /// Publish fresh measurements into every joint cell.
    fn read(&mut self, period: Duration);

    /// Consume the commands written during this cycle.
    fn write(&mut self, period: Duration);

    /// Directory view used to claim joints.
    fn directory(&self) -> &dyn ResourceDirectory;
}
