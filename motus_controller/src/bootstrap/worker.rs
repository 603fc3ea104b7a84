//! Interpreter worker thread.
//!
//! The interpreter is built on, and never leaves, the worker thread. The
//! owning side only ever sees an [`InterpreterHandle`]: a request channel
//! that becomes available once readiness was observed.

use super::HandshakeError;
use super::readiness::{self, ReadySignal, WaitOutcome};
use motus_common::script::{CommandOutput, Interpreter, InterpreterError, InterpreterFactory};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

struct Request {
    command: String,
    reply: Sender<CommandOutput>,
}

/// Owning side's access to the interpreter.
///
/// Not `Clone`: exactly one reader (the startup script runner) exists.
#[derive(Debug)]
pub struct InterpreterHandle {
    namespace: Arc<str>,
    requests: Sender<Request>,
}

impl InterpreterHandle {
    /// Run `command` on the worker and wait for its output.
    ///
    /// # Errors
    /// Returns `InterpreterError::WorkerGone` if the worker has exited.
    pub fn run(&self, command: &str) -> Result<CommandOutput, InterpreterError> {
        let (reply, response) = crossbeam_channel::bounded(1);
        self.requests
            .send(Request {
                command: command.to_string(),
                reply,
            })
            .map_err(|_| InterpreterError::WorkerGone(self.namespace.to_string()))?;
        response
            .recv()
            .map_err(|_| InterpreterError::WorkerGone(self.namespace.to_string()))
    }

    /// Namespace the interpreter is bound to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// A running interpreter worker.
#[derive(Debug)]
pub struct InterpreterWorker {
    handle: InterpreterHandle,
    thread: JoinHandle<()>,
}

impl InterpreterWorker {
    /// Spawn the worker and wait up to `timeout` for readiness.
    ///
    /// `factory` runs on the worker thread with `namespace` as argument.
    ///
    /// # Errors
    /// - `HandshakeError::Spawn` if the thread cannot be created
    /// - `HandshakeError::WorkerFailed` if construction failed or panicked
    /// - `HandshakeError::Stall` if the bound elapsed first; the worker is
    ///   detached and its handle is never handed out
    pub fn spawn(
        namespace: &str,
        factory: InterpreterFactory,
        timeout: Duration,
    ) -> Result<Self, HandshakeError> {
        let (signal, waiter) = readiness::one_shot();
        let (requests, inbox) = crossbeam_channel::unbounded::<Request>();
        let ns: Arc<str> = Arc::from(namespace);

        let worker_ns = Arc::clone(&ns);
        let thread = thread::Builder::new()
            .name(format!("{namespace}-interp"))
            .spawn(move || serve(&worker_ns, factory, signal, inbox))
            .map_err(|source| HandshakeError::Spawn {
                namespace: namespace.to_string(),
                source,
            })?;

        debug!("Waiting up to {:?} for interpreter '{}'", timeout, namespace);
        match waiter.wait_timeout(timeout) {
            WaitOutcome::Ready => {
                info!("Interpreter '{}' ready", namespace);
                Ok(Self {
                    handle: InterpreterHandle {
                        namespace: ns,
                        requests,
                    },
                    thread,
                })
            }
            WaitOutcome::Abandoned => {
                if thread.join().is_err() {
                    warn!("Interpreter worker '{}' panicked during construction", namespace);
                }
                Err(HandshakeError::WorkerFailed {
                    namespace: namespace.to_string(),
                })
            }
            WaitOutcome::TimedOut => Err(HandshakeError::Stall {
                namespace: namespace.to_string(),
                timeout,
            }),
        }
    }

    /// Handle for submitting commands.
    pub fn handle(&self) -> &InterpreterHandle {
        &self.handle
    }

    /// Close the request channel and join the worker.
    pub fn shutdown(self) {
        let Self { handle, thread } = self;
        let namespace = handle.namespace.to_string();
        drop(handle);
        if thread.join().is_err() {
            warn!("Interpreter worker '{}' panicked", namespace);
        } else {
            debug!("Interpreter worker '{}' joined", namespace);
        }
    }
}

/// Worker body: construct, signal, serve until the owner hangs up.
fn serve(
    namespace: &str,
    factory: InterpreterFactory,
    signal: ReadySignal,
    inbox: Receiver<Request>,
) {
    let mut interpreter: Box<dyn Interpreter> = match factory(namespace) {
        Ok(interpreter) => interpreter,
        Err(e) => {
            // Dropping `signal` unfired reports the failure to the waiter.
            error!("Interpreter '{}' construction failed: {e}", namespace);
            return;
        }
    };
    signal.fire();

    let mut served: u64 = 0;
    while let Ok(request) = inbox.recv() {
        let output = interpreter.run(&request.command);
        served += 1;
        // The requester may have given up; nothing to do then.
        let _ = request.reply.send(output);
    }
    debug!("Interpreter worker '{}' exiting after {} commands", namespace, served);
}

#[cfg(test)]
mod tests {
    use super::*;
    use motus_common::script::ResultToken;
    use std::time::Instant;

    struct Echo {
        namespace: String,
    }

    impl Interpreter for Echo {
        fn run(&mut self, command: &str) -> CommandOutput {
            CommandOutput::value(format!("{}:{command}", self.namespace))
        }
    }

    fn echo_factory() -> InterpreterFactory {
        Box::new(|ns: &str| {
            Ok(Box::new(Echo {
                namespace: ns.to_string(),
            }) as Box<dyn Interpreter>)
        })
    }

    #[test]
    fn spawn_binds_namespace_and_serves() {
        let worker = InterpreterWorker::spawn("arm", echo_factory(), Duration::from_secs(5)).unwrap();
        let out = worker.handle().run("1 + 1").unwrap();
        assert_eq!(out.result, ResultToken::Value("arm:1 + 1".to_string()));
        assert_eq!(worker.handle().namespace(), "arm");
        worker.shutdown();
    }

    #[test]
    fn interpreter_lives_on_the_worker_thread() {
        struct ThreadName;
        impl Interpreter for ThreadName {
            fn run(&mut self, _command: &str) -> CommandOutput {
                CommandOutput::value(thread::current().name().unwrap_or("").to_string())
            }
        }
        let factory: InterpreterFactory =
            Box::new(|_: &str| Ok(Box::new(ThreadName) as Box<dyn Interpreter>));
        let worker = InterpreterWorker::spawn("leg", factory, Duration::from_secs(5)).unwrap();
        let out = worker.handle().run("whoami").unwrap();
        assert_eq!(out.result, ResultToken::Value("leg-interp".to_string()));
        worker.shutdown();
    }

    #[test]
    fn construction_failure_is_reported_without_waiting_for_timeout() {
        let factory: InterpreterFactory = Box::new(|_: &str| {
            Err(InterpreterError::ConstructionFailed("no runtime".to_string()))
        });
        let start = Instant::now();
        let err = InterpreterWorker::spawn("arm", factory, Duration::from_secs(30)).unwrap_err();
        assert!(matches!(err, HandshakeError::WorkerFailed { .. }));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn panicking_construction_is_reported_and_joined() {
        let factory: InterpreterFactory =
            Box::new(|ns: &str| -> Result<Box<dyn Interpreter>, InterpreterError> {
                panic!("{ns}: interpreter abort")
            });
        let start = Instant::now();
        let err = InterpreterWorker::spawn("wrist", factory, Duration::from_secs(30)).unwrap_err();
        match err {
            HandshakeError::WorkerFailed { namespace } => assert_eq!(namespace, "wrist"),
            other => panic!("expected worker failure, got {other:?}"),
        }
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn run_after_worker_exit_reports_worker_gone() {
        let (requests, inbox) = crossbeam_channel::unbounded::<Request>();
        drop(inbox);
        let orphan = InterpreterHandle {
            namespace: Arc::from("arm"),
            requests,
        };
        assert!(matches!(
            orphan.run("1"),
            Err(InterpreterError::WorkerGone(ns)) if ns == "arm"
        ));
    }

    #[test]
    fn slow_construction_stalls() {
        let factory: InterpreterFactory = Box::new(|_: &str| {
            thread::sleep(Duration::from_millis(500));
            Ok(Box::new(Echo {
                namespace: String::new(),
            }) as Box<dyn Interpreter>)
        });
        let err = InterpreterWorker::spawn("arm", factory, Duration::from_millis(20)).unwrap_err();
        match err {
            HandshakeError::Stall { namespace, timeout } => {
                assert_eq!(namespace, "arm");
                assert_eq!(timeout, Duration::from_millis(20));
            }
            other => panic!("expected stall, got {other:?}"),
        }
    }
}
