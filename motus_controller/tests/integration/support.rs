//! Shared fixtures: a scripted interpreter, a recording device and a registry.

use motus_common::prelude::*;
use motus_controller::ControllerSettings;
use motus_controller::script::StartupScript;
use motus_hal::JointRegistry;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use toml::Table;

/// Commands seen by a [`Scripted`] interpreter, shared with the test.
pub type Seen = Arc<Mutex<Vec<String>>>;

/// Interpreter that fails at a chosen 1-based step.
///
/// `value:<x>` yields `<x>`; everything else yields no value.
pub struct Scripted {
    fail_at: Option<usize>,
    seen: Seen,
}

impl Interpreter for Scripted {
    fn run(&mut self, command: &str) -> CommandOutput {
        let mut seen = self.seen.lock().unwrap();
        seen.push(command.to_string());
        if Some(seen.len()) == self.fail_at {
            CommandOutput::failure("partial output", "ImportError")
        } else if let Some(v) = command.strip_prefix("value:") {
            CommandOutput::value(v)
        } else {
            CommandOutput::silent()
        }
    }
}

pub fn scripted(fail_at: Option<usize>) -> (InterpreterFactory, Seen) {
    let seen = Seen::default();
    let shared = Arc::clone(&seen);
    let factory: InterpreterFactory = Box::new(move |_: &str| {
        Ok(Box::new(Scripted {
            fail_at,
            seen: shared,
        }) as Box<dyn Interpreter>)
    });
    (factory, seen)
}

/// Device emitting `tick * 100 + index` and remembering what it was aligned to.
pub struct Recorder {
    out: Vec<f64>,
    pub tick: u64,
    pub aligned: Option<Vec<f64>>,
    pub limit: f64,
}

impl Recorder {
    pub fn new(n: usize) -> Self {
        Self {
            out: vec![0.0; n],
            tick: 0,
            aligned: None,
            limit: f64::INFINITY,
        }
    }
}

impl ControlLaw for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn init(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn align_state(&mut self, measured: &[f64]) -> Result<(), AlignmentError> {
        self.aligned = Some(measured.to_vec());
        match measured.iter().position(|p| p.abs() > self.limit) {
            Some(index) => Err(AlignmentError::OutOfRange {
                index,
                value: measured[index],
                min: -self.limit,
                max: self.limit,
            }),
            None => Ok(()),
        }
    }

    fn step(&mut self, _elapsed: Duration) -> &[f64] {
        self.tick += 1;
        for (i, v) in self.out.iter_mut().enumerate() {
            *v = (self.tick * 100 + i as u64) as f64;
        }
        &self.out
    }
}

pub fn registry(joints: &[(&str, f64)]) -> JointRegistry {
    let mut registry = JointRegistry::new();
    for (name, position) in joints {
        registry
            .register(name, CommandInterface::Position, *position)
            .unwrap();
    }
    registry
}

pub fn params(list: &str) -> Table {
    toml::from_str(&format!("actuator_map = {list}")).unwrap()
}

pub fn settings(namespace: &str, commands: &[&str]) -> ControllerSettings {
    ControllerSettings {
        namespace: namespace.to_string(),
        handshake_timeout: Duration::from_secs(5),
        startup: StartupScript::from_commands(commands.iter().copied()),
        ..ControllerSettings::default()
    }
}
