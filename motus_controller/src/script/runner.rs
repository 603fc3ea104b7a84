//! Startup script runner.
//!
//! Each command is echoed to the transcript before it runs. A value result is
//! appended after the echo, a no-value result appends nothing, and a failure
//! appends stdout, a separator and stderr, then aborts the sequence.

use super::ScriptError;
use super::startup::StartupScript;
use super::transcript::Transcript;
use crate::bootstrap::InterpreterHandle;
use motus_common::script::ResultToken;
use tracing::{debug, error};

/// Runs commands against the interpreter worker, in order, synchronously.
pub struct ScriptRunner<'a> {
    interpreter: &'a InterpreterHandle,
    transcript: &'a mut Transcript,
    executed: usize,
}

impl<'a> ScriptRunner<'a> {
    /// Runner writing to `transcript`.
    pub fn new(interpreter: &'a InterpreterHandle, transcript: &'a mut Transcript) -> Self {
        Self {
            interpreter,
            transcript,
            executed: 0,
        }
    }

    /// Commands executed so far, including a failed one.
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Run one command.
    ///
    /// # Errors
    /// - `ScriptError::Failed` if the interpreter reports its failure sentinel
    /// - `ScriptError::Interpreter` if the worker is gone
    pub fn run_command(&mut self, command: &str) -> Result<ResultToken, ScriptError> {
        self.transcript.echo(command);
        self.executed += 1;
        debug!("[{}] >>> {}", self.interpreter.namespace(), command);

        let output = self.interpreter.run(command)?;
        match &output.result {
            ResultToken::NoValue => {}
            ResultToken::Value(text) => self.transcript.line(text),
            ResultToken::Failure => {
                self.transcript.failure(&output.stdout, &output.stderr);
                error!(
                    "[{}] startup command {} failed: {}",
                    self.interpreter.namespace(),
                    self.executed,
                    output.stderr.trim_end()
                );
                return Err(ScriptError::Failed {
                    step: self.executed,
                    command: command.to_string(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                    transcript: self.transcript.location(),
                });
            }
        }
        Ok(output.result)
    }

    /// Run every command of `script`; the first failure stops the sequence.
    ///
    /// Returns the number of commands executed.
    pub fn run_script(&mut self, script: &StartupScript) -> Result<usize, ScriptError> {
        for command in script.commands() {
            self.run_command(command)?;
        }
        Ok(self.executed)
    }
}
