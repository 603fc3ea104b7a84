//! Scripting interpreter capability.
//!
//! An interpreter executes one textual command at a time and reports three
//! outputs: a result token, captured stdout and captured stderr. Interpreters
//! are constructed on, and never leave, the worker thread that serves them,
//! so the trait does not require `Send`.

use thiserror::Error;

/// Result token of one interpreter command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultToken {
    /// The command produced a printable value.
    Value(String),
    /// The command produced no value.
    NoValue,
    /// The command raised; details are in stdout/stderr.
    Failure,
}

impl ResultToken {
    /// Textual sentinel for "no value".
    pub const NO_VALUE: &'static str = "None";

    /// Textual sentinel for a failed command.
    pub const FAILURE: &'static str = "<NULL>";

    /// Classify a raw result string reported by a text-based interpreter.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            Self::NO_VALUE => Self::NoValue,
            Self::FAILURE => Self::Failure,
            other => Self::Value(other.to_string()),
        }
    }

    /// Whether this is the failure sentinel.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure)
    }
}

/// Everything one command reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Result token.
    pub result: ResultToken,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Successful command without a value and without output.
    pub fn silent() -> Self {
        Self {
            result: ResultToken::NoValue,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Successful command producing `value`.
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            result: ResultToken::Value(value.into()),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Failed command with captured output.
    pub fn failure(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            result: ResultToken::Failure,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Interpreter construction or transport failure.
#[derive(Debug, Clone, Error)]
pub enum InterpreterError {
    /// The interpreter could not be constructed.
    #[error("interpreter construction failed: {0}")]
    ConstructionFailed(String),

    /// The worker serving the interpreter is gone.
    #[error("interpreter worker '{0}' is not running")]
    WorkerGone(String),
}

/// A textual command interpreter.
pub trait Interpreter {
    /// Execute `command` synchronously.
    fn run(&mut self, command: &str) -> CommandOutput;
}

/// Builds an interpreter bound to a namespace, on the thread that will own it.
pub type InterpreterFactory =
    Box<dyn FnOnce(&str) -> Result<Box<dyn Interpreter>, InterpreterError> + Send>;
