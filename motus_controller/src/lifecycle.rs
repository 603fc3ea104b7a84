//! Controller lifecycle: Constructed → Initialized → Starting → Running → Stopped.
//!
//! [`LifecycleMachine`] holds the phase and the transition table.
//! [`ControllerPlugin`] is the four-operation surface a host drives.

use crate::error::ControllerError;
use motus_common::hal::ResourceDirectory;
use motus_common::lifecycle::LifecyclePhase;
use motus_common::params::ParameterSource;
use std::time::Duration;

/// Result of a lifecycle transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition accepted; new phase.
    Ok(LifecyclePhase),
    /// Transition rejected; reason.
    Rejected(&'static str),
}

/// Lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Startup script, claim and device init all succeeded.
    InitSucceeded,
    /// Any Init step failed.
    InitFailed,
    /// Host asked for Starting.
    StartRequested,
    /// Measured state handed to the device (faults included).
    Aligned,
    /// Teardown requested.
    Teardown,
}

/// Phase holder and transition table.
#[derive(Debug, Clone, Default)]
pub struct LifecycleMachine {
    phase: LifecyclePhase,
}

impl LifecycleMachine {
    /// Machine in `Constructed`.
    pub const fn new() -> Self {
        Self {
            phase: LifecyclePhase::Constructed,
        }
    }

    /// Current phase.
    #[inline]
    pub const fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Attempt a transition.
    pub fn handle_event(&mut self, event: LifecycleEvent) -> TransitionResult {
        use LifecycleEvent::*;
        use LifecyclePhase::*;

        let next = match (self.phase, event) {
            (Constructed, InitSucceeded) => Initialized,
            (Constructed, InitFailed) => Stopped,
            (Initialized, StartRequested) => Starting,
            (Starting, Aligned) => Running,
            (Stopped, Teardown) => return TransitionResult::Rejected("already stopped"),
            (_, Teardown) => Stopped,
            _ => return TransitionResult::Rejected(rejection_reason(self.phase, event)),
        };

        self.phase = next;
        TransitionResult::Ok(next)
    }
}

fn rejection_reason(phase: LifecyclePhase, event: LifecycleEvent) -> &'static str {
    use LifecycleEvent::*;
    use LifecyclePhase::*;
    match (phase, event) {
        (Stopped, _) => "controller is stopped",
        (_, InitSucceeded | InitFailed) => "init only runs once, from Constructed",
        (_, StartRequested) => "start requires Initialized",
        (_, Aligned) => "alignment only completes from Starting",
        (_, Teardown) => "teardown not allowed",
    }
}

/// Lifecycle surface a host drives.
///
/// Hosts call `init` once, `starting` once, `update` every tick and
/// `teardown` at most once; out-of-order calls are rejected without side
/// effects.
pub trait ControllerPlugin {
    /// Run the startup script, claim actuators, initialize the device.
    ///
    /// On error the controller is `Stopped` and holds no actuators.
    fn init(
        &mut self,
        directory: &dyn ResourceDirectory,
        params: &dyn ParameterSource,
    ) -> Result<(), ControllerError>;

    /// Align the device to measured positions and enter `Running`.
    ///
    /// An alignment fault is logged and recorded; it does not fail the call.
    fn starting(&mut self) -> Result<(), ControllerError>;

    /// One control tick. Never blocks, allocates or fails.
    fn update(&mut self, elapsed: Duration);

    /// Report final positions and release the interpreter worker.
    fn teardown(&mut self);

    /// Current phase.
    fn phase(&self) -> LifecyclePhase;
}
