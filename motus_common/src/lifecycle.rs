//! Controller lifecycle phases.
//!
//! `#[repr(u8)]` so a phase can be published as a single byte to external
//! monitors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Controller lifecycle phase.
///
/// Monotonic: Constructed → Initialized → Starting → Running → Stopped.
/// A failed Init goes straight to `Stopped`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum LifecyclePhase {
    /// Interpreter worker is up; nothing claimed yet.
    #[default]
    Constructed = 0,
    /// Startup script ran, actuators claimed, device initialized.
    Initialized = 1,
    /// Measured state is being transferred into the device.
    Starting = 2,
    /// Closed-loop ticks are accepted.
    Running = 3,
    /// Non-operational; torn down or failed to initialize.
    Stopped = 4,
}

impl LifecyclePhase {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Constructed),
            1 => Some(Self::Initialized),
            2 => Some(Self::Starting),
            3 => Some(Self::Running),
            4 => Some(Self::Stopped),
            _ => None,
        }
    }

    /// Whether Update ticks write commands in this phase.
    #[inline]
    pub const fn is_operational(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
