//! Built-in collaborators for the standalone binary.
//!
//! - [`hold`] - Control-law device that holds the measured position
//! - [`null`] - Interpreter that accepts every command silently

pub mod hold;
pub mod null;

pub use hold::{HoldDeviceConfig, HoldPosition};
pub use null::{NullInterpreter, null_factory};
