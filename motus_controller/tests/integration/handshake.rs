//! Bootstrap handshake: bounded wait, fast failure, one-shot readiness.

use motus_common::script::{CommandOutput, Interpreter, InterpreterError, InterpreterFactory};
use motus_controller::bootstrap::{HandshakeError, InterpreterWorker, WaitOutcome, one_shot};
use motus_controller::script::{SharedBuffer, Transcript};
use motus_controller::{Controller, ControllerError, ControllerPlugin, FaultKind};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::support::{Recorder, params, registry, scripted, settings};

struct Quiet;

impl Interpreter for Quiet {
    fn run(&mut self, _command: &str) -> CommandOutput {
        CommandOutput::silent()
    }
}

#[test]
fn construction_returns_with_a_usable_interpreter() {
    let dir = registry(&[("shoulder", 0.0)]);
    let (factory, seen) = scripted(None);
    let buffer = SharedBuffer::new();
    let mut c = Controller::with_transcript(
        settings("arm", &["value:7"]),
        Transcript::from_writer(buffer.clone()),
        Recorder::new(1),
        factory,
    )
    .unwrap();
    assert!(c.interpreter_ready());

    c.init(&dir, &params(r#"["shoulder"]"#)).unwrap();
    assert_eq!(seen.lock().unwrap().as_slice(), &["value:7"]);
    assert_eq!(buffer.lines(), vec![">>> value:7", "7"]);
}

#[test]
fn stalled_worker_is_a_handshake_fault() {
    let factory: InterpreterFactory = Box::new(|_: &str| {
        thread::sleep(Duration::from_millis(500));
        Ok(Box::new(Quiet) as Box<dyn Interpreter>)
    });
    let mut s = settings("stall", &[]);
    s.handshake_timeout = Duration::from_millis(50);

    let start = Instant::now();
    let err = Controller::new(s, Recorder::new(0), factory).unwrap_err();
    assert!(start.elapsed() < Duration::from_millis(400));
    assert_eq!(err.kind(), FaultKind::HandshakeStall);
}

#[test]
fn failed_construction_does_not_wait_for_the_timeout() {
    let factory: InterpreterFactory = Box::new(|ns: &str| {
        Err(InterpreterError::ConstructionFailed(format!("{ns}: no runtime")))
    });
    let start = Instant::now();
    let err = InterpreterWorker::spawn("broken", factory, Duration::from_secs(10)).unwrap_err();
    assert!(matches!(err, HandshakeError::WorkerFailed { .. }));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn readiness_is_observed_once_and_stays() {
    let (signal, waiter) = one_shot();
    let t = thread::spawn(move || signal.fire());
    assert_eq!(waiter.wait_timeout(Duration::from_secs(5)), WaitOutcome::Ready);
    t.join().unwrap();
    // Later observations never block again.
    let start = Instant::now();
    assert_eq!(waiter.wait_timeout(Duration::from_secs(5)), WaitOutcome::Ready);
    assert!(waiter.is_ready());
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn panicking_construction_does_not_wait_for_the_timeout() {
    let factory: InterpreterFactory =
        Box::new(|ns: &str| -> Result<Box<dyn Interpreter>, InterpreterError> {
            panic!("{ns}: interpreter aborted")
        });
    let mut s = settings("panicky", &[]);
    s.handshake_timeout = Duration::from_secs(10);

    let start = Instant::now();
    let err = Controller::new(s, Recorder::new(0), factory).unwrap_err();
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(err.kind(), FaultKind::HandshakeStall);
    assert!(matches!(
        err,
        ControllerError::Handshake(HandshakeError::WorkerFailed { ref namespace }) if namespace == "panicky"
    ));
}

#[test]
fn each_controller_has_its_own_rendezvous() {
    let built = Arc::new(Mutex::new(Vec::new()));
    let factory = |built: &Arc<Mutex<Vec<(String, String)>>>| -> InterpreterFactory {
        let built = Arc::clone(built);
        Box::new(move |ns: &str| {
            let thread = thread::current().name().unwrap_or("").to_string();
            built.lock().unwrap().push((ns.to_string(), thread));
            Ok(Box::new(Quiet) as Box<dyn Interpreter>)
        })
    };
    let a = Controller::new(settings("left", &[]), Recorder::new(0), factory(&built)).unwrap();
    let b = Controller::new(settings("right", &[]), Recorder::new(0), factory(&built)).unwrap();
    assert!(a.interpreter_ready() && b.interpreter_ready());
    assert_eq!(a.namespace(), "left");
    assert_eq!(b.namespace(), "right");

    let built = built.lock().unwrap();
    assert_eq!(
        built.as_slice(),
        &[
            ("left".to_string(), "left-interp".to_string()),
            ("right".to_string(), "right-interp".to_string()),
        ]
    );
}
