//! Startup script execution.
//!
//! - [`startup`] - The ordered command sequence run at Init
//! - [`runner`] - Executes commands against the interpreter worker
//! - [`transcript`] - Append-only log of the interaction

pub mod runner;
pub mod startup;
pub mod transcript;

pub use runner::ScriptRunner;
pub use startup::StartupScript;
pub use transcript::{SharedBuffer, Transcript};

use motus_common::script::InterpreterError;
use thiserror::Error;

/// A startup command failed; the remaining commands were not run.
#[derive(Debug, Clone, Error)]
pub enum ScriptError {
    /// The interpreter reported its failure sentinel.
    #[error(
        "exception caught during controller initialization at step {step} (`{command}`), \
         please check the transcript: {transcript}"
    )]
    Failed {
        /// 1-based position of the failing command.
        step: usize,
        /// The failing command.
        command: String,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
        /// Where the transcript was written.
        transcript: String,
    },

    /// The command never reached the interpreter.
    #[error(transparent)]
    Interpreter(#[from] InterpreterError),
}
