//! The controller: ties the interpreter worker, startup script, actuator claim
//! and control-law device into one lifecycle.
//!
//! # Timing Contracts
//!
//! | Operation    | RT Constraint |
//! |--------------|---------------|
//! | `new()`      | None (blocks on the handshake, bounded) |
//! | `init()`     | None (script + lookups) |
//! | `starting()` | None |
//! | `update()`   | **HARD** (no lock, no I/O, no allocation, no logging) |
//! | `teardown()` | None (joins the worker) |

use crate::bootstrap::InterpreterWorker;
use crate::claim::{ClaimedActuatorSet, claim_from_parameters};
use crate::error::{ControllerError, Fault};
use crate::lifecycle::{ControllerPlugin, LifecycleEvent, LifecycleMachine, TransitionResult};
use crate::script::{ScriptRunner, StartupScript, Transcript};
use motus_common::consts::{
    DEFAULT_HANDSHAKE_TIMEOUT_MS, DEFAULT_NAMESPACE, DEFAULT_PARAMETER_KEY, MAX_ACTUATORS,
};
use motus_common::device::ControlLaw;
use motus_common::hal::{CommandInterface, ResourceDirectory};
use motus_common::lifecycle::LifecyclePhase;
use motus_common::params::ParameterSource;
use motus_common::script::InterpreterFactory;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Construction-time settings.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Namespace the interpreter is bound to; also names the worker thread.
    pub namespace: String,
    /// Bound on the bootstrap handshake.
    pub handshake_timeout: Duration,
    /// Parameter key holding the actuator name list.
    pub parameter_key: String,
    /// Interface every actuator is claimed through.
    pub interface: CommandInterface,
    /// Commands run at Init.
    pub startup: StartupScript,
    /// Transcript file; `None` discards the transcript.
    pub transcript_path: Option<PathBuf>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            handshake_timeout: Duration::from_millis(DEFAULT_HANDSHAKE_TIMEOUT_MS),
            parameter_key: DEFAULT_PARAMETER_KEY.to_string(),
            interface: CommandInterface::Position,
            startup: StartupScript::default(),
            transcript_path: None,
        }
    }
}

/// Update tick counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Ticks that wrote commands.
    pub ticks: u64,
    /// Ticks ignored because the controller was not running.
    pub rejected_ticks: u64,
    /// Ticks where the command vector length differed from the actuator count.
    pub command_mismatches: u64,
}

/// Real-time actuator controller driving a control-law device `D`.
pub struct Controller<D: ControlLaw> {
    namespace: String,
    parameter_key: String,
    interface: CommandInterface,
    startup: StartupScript,
    lifecycle: LifecycleMachine,
    worker: Option<InterpreterWorker>,
    transcript: Transcript,
    device: D,
    actuators: ClaimedActuatorSet,
    measured: [f64; MAX_ACTUATORS],
    stats: UpdateStats,
    last_fault: Option<Fault>,
    device_initialized: bool,
    torn_down: bool,
}

impl<D: ControlLaw> Controller<D> {
    /// Truncate the transcript, spawn the interpreter worker and wait for it.
    ///
    /// # Errors
    /// - `ControllerError::Transcript` if the transcript file cannot be created
    /// - `ControllerError::Handshake` if the worker fails or stalls
    pub fn new(
        settings: ControllerSettings,
        device: D,
        factory: InterpreterFactory,
    ) -> Result<Self, ControllerError> {
        let transcript = match &settings.transcript_path {
            Some(path) => Transcript::create(path).map_err(|source| ControllerError::Transcript {
                path: path.clone(),
                source,
            })?,
            None => Transcript::discard(),
        };
        Self::with_transcript(settings, transcript, device, factory)
    }

    /// Like [`Controller::new`] with a caller-supplied transcript.
    ///
    /// `settings.transcript_path` is ignored.
    ///
    /// # Errors
    /// Returns `ControllerError::Handshake` if the interpreter worker fails to
    /// spawn, exits before signalling readiness, or stalls past
    /// `settings.handshake_timeout`.
    pub fn with_transcript(
        settings: ControllerSettings,
        transcript: Transcript,
        device: D,
        factory: InterpreterFactory,
    ) -> Result<Self, ControllerError> {
        info!(
            "Constructing controller '{}' (device '{}')",
            settings.namespace,
            device.name()
        );
        let worker =
            InterpreterWorker::spawn(&settings.namespace, factory, settings.handshake_timeout)?;

        Ok(Self {
            namespace: settings.namespace,
            parameter_key: settings.parameter_key,
            interface: settings.interface,
            startup: settings.startup,
            lifecycle: LifecycleMachine::new(),
            worker: Some(worker),
            transcript,
            device,
            actuators: ClaimedActuatorSet::new(),
            measured: [0.0; MAX_ACTUATORS],
            stats: UpdateStats::default(),
            last_fault: None,
            device_initialized: false,
            torn_down: false,
        })
    }

    /// Namespace the interpreter is bound to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Claimed actuators; empty before a successful Init.
    pub fn actuators(&self) -> &ClaimedActuatorSet {
        &self.actuators
    }

    /// The control-law device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable access to the control-law device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Update counters.
    pub fn stats(&self) -> UpdateStats {
        self.stats
    }

    /// Most recent handled fault, fatal or not.
    pub fn last_fault(&self) -> Option<&Fault> {
        self.last_fault.as_ref()
    }

    /// `true` from a completed handshake until teardown joins the worker.
    pub fn interpreter_ready(&self) -> bool {
        self.worker.is_some()
    }

    fn run_init(
        &mut self,
        directory: &dyn ResourceDirectory,
        params: &dyn ParameterSource,
    ) -> Result<ClaimedActuatorSet, ControllerError> {
        let worker = self.worker.as_ref().ok_or(ControllerError::InvalidTransition {
            operation: "init",
            phase: self.lifecycle.phase(),
        })?;

        let mut runner = ScriptRunner::new(worker.handle(), &mut self.transcript);
        let executed = runner.run_script(&self.startup)?;
        debug!("[{}] {} startup commands executed", self.namespace, executed);

        let claimed = claim_from_parameters(directory, params, &self.parameter_key, self.interface)?;
        info!(
            "[{}] Claimed {} actuators: {:?}",
            self.namespace,
            claimed.len(),
            claimed.names()
        );

        self.device.init()?;
        self.device_initialized = true;
        Ok(claimed)
    }

    fn report_positions(&mut self) {
        for (i, handle) in self.actuators.iter().enumerate() {
            let line = format!(
                "actuator_{i} ({}) position: {}",
                handle.name(),
                handle.position()
            );
            info!("[{}] {}", self.namespace, line);
            self.transcript.line(&line);
        }
    }
}

impl<D: ControlLaw> ControllerPlugin for Controller<D> {
    fn init(
        &mut self,
        directory: &dyn ResourceDirectory,
        params: &dyn ParameterSource,
    ) -> Result<(), ControllerError> {
        let phase = self.lifecycle.phase();
        if phase != LifecyclePhase::Constructed {
            return Err(ControllerError::InvalidTransition {
                operation: "init",
                phase,
            });
        }

        match self.run_init(directory, params) {
            Ok(claimed) => {
                // Commit only a complete set.
                self.actuators = claimed;
                self.lifecycle.handle_event(LifecycleEvent::InitSucceeded);
                info!("[{}] Initialized", self.namespace);
                Ok(())
            }
            Err(e) => {
                error!("[{}] Init failed ({}): {e}", self.namespace, e.kind());
                self.last_fault = Some(e.to_fault());
                self.lifecycle.handle_event(LifecycleEvent::InitFailed);
                Err(e)
            }
        }
    }

    fn starting(&mut self) -> Result<(), ControllerError> {
        if let TransitionResult::Rejected(reason) =
            self.lifecycle.handle_event(LifecycleEvent::StartRequested)
        {
            debug!("[{}] start rejected: {reason}", self.namespace);
            return Err(ControllerError::InvalidTransition {
                operation: "start",
                phase: self.lifecycle.phase(),
            });
        }

        let n = self.actuators.len();
        for (slot, handle) in self.measured.iter_mut().zip(self.actuators.iter()) {
            *slot = handle.position();
        }
        if let Err(e) = self.device.align_state(&self.measured[..n]) {
            // Best effort: the device corrects itself on the first tick.
            let err = ControllerError::from(e);
            error!("[{}] Out of range on starting: {err}", self.namespace);
            self.last_fault = Some(err.to_fault());
        }

        self.lifecycle.handle_event(LifecycleEvent::Aligned);
        info!("[{}] Running with {} actuators", self.namespace, n);
        Ok(())
    }

    #[inline]
    fn update(&mut self, elapsed: Duration) {
        if !self.lifecycle.phase().is_operational() {
            self.stats.rejected_ticks += 1;
            return;
        }

        let commands = self.device.step(elapsed);
        let handles = self.actuators.as_slice();
        if commands.len() != handles.len() {
            self.stats.command_mismatches += 1;
        }
        for (handle, &value) in handles.iter().zip(commands) {
            handle.set_command(value);
        }
        self.stats.ticks += 1;
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if let TransitionResult::Rejected(reason) =
            self.lifecycle.handle_event(LifecycleEvent::Teardown)
        {
            debug!("[{}] teardown: {reason}", self.namespace);
        }

        self.report_positions();
        if self.device_initialized {
            self.device.shutdown();
        }
        if let Some(worker) = self.worker.take() {
            worker.shutdown();
        }
        if self.stats.rejected_ticks > 0 || self.stats.command_mismatches > 0 {
            warn!(
                "[{}] {} ticks rejected, {} command length mismatches",
                self.namespace, self.stats.rejected_ticks, self.stats.command_mismatches
            );
        }
        info!(
            "[{}] Stopped after {} ticks",
            self.namespace, self.stats.ticks
        );
    }

    fn phase(&self) -> LifecyclePhase {
        self.lifecycle.phase()
    }
}

impl<D: ControlLaw> Drop for Controller<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<D: ControlLaw> std::fmt::Debug for Controller<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("namespace", &self.namespace)
            .field("phase", &self.lifecycle.phase())
            .field("device", &self.device.name())
            .field("actuators", &self.actuators.names())
            .field("stats", &self.stats)
            .finish()
    }
}
