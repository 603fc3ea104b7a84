//! Joint state and joint handles.
//!
//! A [`JointState`] is the shared cell between a hardware backend and a
//! controller. The backend publishes measurements into it and consumes the
//! command; the controller holds a [`JointHandle`] that reads measurements and
//! writes the command. All fields are atomics so neither side ever locks.

use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Command interface a joint is exposed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommandInterface {
    /// Command is a target position.
    #[default]
    Position,
    /// Command is a target velocity.
    Velocity,
    /// Command is a target effort (force/torque).
    Effort,
}

impl fmt::Display for CommandInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Position => "position",
            Self::Velocity => "velocity",
            Self::Effort => "effort",
        };
        f.write_str(s)
    }
}

/// `f64` stored as its bit pattern.
#[derive(Debug)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    #[inline]
    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// Shared measurement/command cell for one joint.
#[derive(Debug)]
pub struct JointState {
    position: AtomicF64,
    velocity: AtomicF64,
    effort: AtomicF64,
    command: AtomicF64,
    /// Incremented on every command write.
    command_seq: AtomicU64,
}

impl JointState {
    /// New cell at `position`, at rest, with the command parked on the
    /// current position.
    pub fn new(position: f64) -> Self {
        Self {
            position: AtomicF64::new(position),
            velocity: AtomicF64::new(0.0),
            effort: AtomicF64::new(0.0),
            command: AtomicF64::new(position),
            command_seq: AtomicU64::new(0),
        }
    }

    /// Publish a new measurement. Called by the hardware backend.
    #[inline]
    pub fn publish(&self, position: f64, velocity: f64, effort: f64) {
        self.position.store(position);
        self.velocity.store(velocity);
        self.effort.store(effort);
    }

    /// Last published position.
    #[inline]
    pub fn position(&self) -> f64 {
        self.position.load()
    }

    /// Last published velocity.
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity.load()
    }

    /// Last published effort.
    #[inline]
    pub fn effort(&self) -> f64 {
        self.effort.load()
    }

    /// Last written command.
    #[inline]
    pub fn command(&self) -> f64 {
        self.command.load()
    }

    /// Number of command writes since creation.
    ///
    /// Backends compare successive values to tell a fresh command from a
    /// stale one.
    #[inline]
    pub fn command_seq(&self) -> u64 {
        self.command_seq.load(Ordering::Acquire)
    }

    #[inline]
    fn write_command(&self, value: f64) {
        self.command.store(value);
        self.command_seq.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for JointState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Controller-side reference to a claimed joint.
///
/// Cloning is cheap (one `Arc` bump) and never touches the directory.
#[derive(Clone)]
pub struct JointHandle {
    name: Arc<str>,
    interface: CommandInterface,
    state: Arc<JointState>,
}

impl JointHandle {
    /// Wrap a shared joint cell.
    pub fn new(name: impl Into<Arc<str>>, interface: CommandInterface, state: Arc<JointState>) -> Self {
        Self {
            name: name.into(),
            interface,
            state,
        }
    }

    /// Joint name as registered in the directory.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interface the handle commands through.
    pub fn interface(&self) -> CommandInterface {
        self.interface
    }

    /// Measured position.
    #[inline]
    pub fn position(&self) -> f64 {
        self.state.position()
    }

    /// Measured velocity.
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.state.velocity()
    }

    /// Measured effort.
    #[inline]
    pub fn effort(&self) -> f64 {
        self.state.effort()
    }

    /// Write the command for this cycle. Lock-free, never fails.
    #[inline]
    pub fn set_command(&self, value: f64) {
        self.state.write_command(value);
    }

    /// Last command written through any handle to this joint.
    #[inline]
    pub fn command(&self) -> f64 {
        self.state.command()
    }

    /// See [`JointState::command_seq`].
    #[inline]
    pub fn command_seq(&self) -> u64 {
        self.state.command_seq()
    }

    /// Whether both handles refer to the same joint cell.
    pub fn same_joint(&self, other: &JointHandle) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for JointHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JointHandle")
            .field("name", &self.name)
            .field("interface", &self.interface)
            .field("position", &self.position())
            .field("command", &self.command())
            .finish()
    }
}

assert_impl_all!(JointHandle: Send, Sync, Clone);
assert_impl_all!(JointState: Send, Sync);
