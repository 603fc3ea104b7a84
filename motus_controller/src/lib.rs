//! # Motus Controller Library
//!
//! Bridges a fixed-rate control loop to a control-law device whose startup is
//! configured through a scripting interpreter running on its own worker
//! thread.
//!
//! ## Three timelines
//!
//! 1. **Construction**: [`bootstrap`] spawns the interpreter worker and
//!    blocks (bounded) until it signals readiness.
//! 2. **Init**: [`script`] feeds the startup commands to the interpreter,
//!    then [`claim`] resolves every named actuator all-or-nothing, then the
//!    device initializes.
//! 3. **Update**: every tick the device computes a command vector that is
//!    written onto the claimed handles. No locks, no I/O, no allocation.
//!
//! [`lifecycle`] gates the transitions between them and [`controller`] ties
//! everything together. [`cycle`] drives read → update → write at a fixed
//! rate for the binary.

pub mod bootstrap;
pub mod builtin;
pub mod claim;
pub mod config;
pub mod controller;
pub mod cycle;
pub mod error;
pub mod lifecycle;
pub mod script;

pub use crate::controller::{Controller, ControllerSettings};
pub use crate::error::{ControllerError, Fault, FaultKind};
pub use crate::lifecycle::ControllerPlugin;
