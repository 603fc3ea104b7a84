//! Control-law device capability.
//!
//! The device computes actuator commands from its own internal state. The
//! controller owns it and drives it through three calls:
//!
//! 1. `init()` - once, after actuators are claimed
//! 2. `align_state()` - once per start, with measured positions
//! 3. `step()` - every control tick
//!
//! # Timing Contracts
//!
//! | Operation       | RT Constraint |
//! |-----------------|---------------|
//! | `init()`        | None (pre-RT) |
//! | `align_state()` | None (pre-RT) |
//! | `step()`        | **HARD**      |
//! | `shutdown()`    | None (post-RT)|

use std::time::Duration;
use thiserror::Error;

/// Fatal device failure during `init()`.
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    /// Device-specific initialization failure.
    #[error("device initialization failed: {0}")]
    InitFailed(String),
}

/// A measured state the device cannot accept.
///
/// Recoverable: the device is expected to correct itself on the first tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignmentError {
    /// A measured position lies outside the accepted domain.
    #[error("actuator {index} position {value} outside [{min}, {max}]")]
    OutOfRange {
        /// Actuator index.
        index: usize,
        /// Measured value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// The device expected a different number of actuators.
    #[error("expected {expected} measured positions, got {actual}")]
    DimensionMismatch {
        /// Dimension the device was built for.
        expected: usize,
        /// Dimension handed in.
        actual: usize,
    },
}

/// A control-law computation device.
pub trait ControlLaw: Send {
    /// Device identifier for logs.
    fn name(&self) -> &str;

    /// One-time initialization after actuators are claimed.
    fn init(&mut self) -> Result<(), DeviceError>;

    /// Align internal state to measured positions before closed-loop operation.
    fn align_state(&mut self, measured: &[f64]) -> Result<(), AlignmentError>;

    /// Advance one control step and return the command vector.
    ///
    /// MUST NOT block or allocate. The returned slice is index-aligned with
    /// the claimed actuators.
    fn step(&mut self, elapsed: Duration) -> &[f64];

    /// Release device resources at teardown.
    ///
    /// Default implementation does nothing.
    fn shutdown(&mut self) {}
}
