//! Interpreter stand-in: every command succeeds without a value.

use motus_common::script::{CommandOutput, Interpreter, InterpreterFactory};
use tracing::debug;

/// Accepts and ignores every command.
#[derive(Debug, Default)]
pub struct NullInterpreter {
    namespace: String,
    executed: usize,
}

impl NullInterpreter {
    /// Interpreter bound to `namespace`.
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            executed: 0,
        }
    }

    /// Commands seen so far.
    pub fn executed(&self) -> usize {
        self.executed
    }
}

impl Interpreter for NullInterpreter {
    fn run(&mut self, command: &str) -> CommandOutput {
        self.executed += 1;
        debug!("[{}] ignoring `{}`", self.namespace, command);
        CommandOutput::silent()
    }
}

/// Factory building a [`NullInterpreter`] on the worker thread.
pub fn null_factory() -> InterpreterFactory {
    Box::new(|namespace: &str| Ok(Box::new(NullInterpreter::new(namespace)) as Box<dyn Interpreter>))
}
