//! Controller faults.
//!
//! Every fault carries a [`FaultKind`] tag plus its diagnostic payload.
//! Init-phase faults stop at the Init boundary; Update never produces one.

use crate::bootstrap::HandshakeError;
use crate::claim::ClaimError;
use crate::script::ScriptError;
use motus_common::device::{AlignmentError, DeviceError};
use motus_common::lifecycle::LifecyclePhase;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fault classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Missing or malformed actuator configuration.
    Configuration,
    /// A named actuator could not be resolved.
    ResourceUnavailable,
    /// A startup command failed.
    ScriptExecution,
    /// Measured state rejected by the device at Starting (non-fatal).
    StateAlignment,
    /// The interpreter worker never became ready.
    HandshakeStall,
    /// The control-law device failed to initialize.
    Device,
    /// Operation not allowed in the current phase.
    Lifecycle,
    /// Filesystem or OS failure.
    Io,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Top-level controller error.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Interpreter bootstrap failed.
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    /// Startup script failed.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Actuator claim failed.
    #[error(transparent)]
    Claim(#[from] ClaimError),

    /// Device initialization failed.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Device rejected the measured state.
    #[error("state alignment fault: {0}")]
    Alignment(#[from] AlignmentError),

    /// Lifecycle operation called out of order.
    #[error("cannot {operation} while {phase}")]
    InvalidTransition {
        /// Requested operation.
        operation: &'static str,
        /// Phase at the time of the call.
        phase: LifecyclePhase,
    },

    /// Transcript file could not be created.
    #[error("cannot create transcript {}: {source}", path.display())]
    Transcript {
        /// Transcript path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl ControllerError {
    /// Classification tag.
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::Handshake(HandshakeError::Spawn { .. }) => FaultKind::Io,
            Self::Handshake(_) => FaultKind::HandshakeStall,
            Self::Script(_) => FaultKind::ScriptExecution,
            Self::Claim(e) if e.is_configuration() => FaultKind::Configuration,
            Self::Claim(_) => FaultKind::ResourceUnavailable,
            Self::Device(_) => FaultKind::Device,
            Self::Alignment(_) => FaultKind::StateAlignment,
            Self::InvalidTransition { .. } => FaultKind::Lifecycle,
            Self::Transcript { .. } => FaultKind::Io,
        }
    }

    /// Owned summary, kept by the controller after the error is returned.
    pub fn to_fault(&self) -> Fault {
        Fault {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Owned record of a handled fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Classification tag.
    pub kind: FaultKind,
    /// Rendered diagnostic.
    pub message: String,
}
