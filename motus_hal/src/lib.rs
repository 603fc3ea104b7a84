//! # Motus HAL Library
//!
//! Simulated hardware backend for the motus controller.
//!
//! # Module Structure
//!
//! - [`config`] - `[hardware]` TOML section
//! - [`registry`] - Joint registry implementing `ResourceDirectory`
//! - [`simulation`] - Per-joint physics implementing `RobotHardware`
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     motus_hal                              │
//! │  ┌──────────────────┐        ┌──────────────────────────┐  │
//! │  │  JointRegistry   │◄──────►│  SimulatedHardware       │  │
//! │  │  (name → cell)   │        │  (read / write per cycle)│  │
//! │  └────────┬─────────┘        └──────────────────────────┘  │
//! │           │ lookup(name, interface)                        │
//! │           ▼                                                │
//! │     JointHandle (controller side)                          │
//! └────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod registry;
pub mod simulation;

pub use crate::config::{HardwareConfig, SimJointConfig};
pub use crate::registry::JointRegistry;
pub use crate::simulation::SimulatedHardware;
