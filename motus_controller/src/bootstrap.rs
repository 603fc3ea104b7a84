//! Interpreter bootstrap handshake.
//!
//! Construction spawns a worker thread that builds the interpreter, fires a
//! one-shot readiness signal and then serves commands until the controller
//! lets go of its [`InterpreterHandle`]. The constructing thread waits on the
//! signal with a bound; a worker that never becomes ready is a
//! [`HandshakeError`], never an indefinite block.

pub mod readiness;
pub mod worker;

pub use readiness::{ReadySignal, ReadyWaiter, WaitOutcome, one_shot};
pub use worker::{InterpreterHandle, InterpreterWorker};

use std::time::Duration;
use thiserror::Error;

/// The interpreter worker did not come up.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// The OS refused to create the worker thread.
    #[error("failed to spawn interpreter worker '{namespace}': {source}")]
    Spawn {
        /// Namespace the interpreter was to be bound to.
        namespace: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The worker dropped its signal without firing it.
    #[error("interpreter worker '{namespace}' exited before signalling readiness")]
    WorkerFailed {
        /// Namespace the interpreter was to be bound to.
        namespace: String,
    },

    /// The worker did not signal within the bound.
    #[error("interpreter '{namespace}' not ready after {timeout:?}")]
    Stall {
        /// Namespace the interpreter was to be bound to.
        namespace: String,
        /// Bound that elapsed.
        timeout: Duration,
    },
}
