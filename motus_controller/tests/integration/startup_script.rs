//! Startup script through Init: ordering, transcript, failure.

use motus_common::lifecycle::LifecyclePhase;
use motus_controller::script::{ScriptError, SharedBuffer, Transcript};
use motus_controller::{Controller, ControllerError, ControllerPlugin, FaultKind};

use super::support::{Recorder, params, registry, scripted, settings};

const FIVE: [&str; 5] = ["a = 1", "value:2", "import missing", "b = 3", "c = 4"];

#[test]
fn failure_at_step_three_stops_the_script() {
    let dir = registry(&[("shoulder", 0.0)]);
    let (factory, seen) = scripted(Some(3));
    let buffer = SharedBuffer::new();
    let mut c = Controller::with_transcript(
        settings("arm", &FIVE),
        Transcript::from_writer(buffer.clone()),
        Recorder::new(1),
        factory,
    )
    .unwrap();

    let err = c.init(&dir, &params(r#"["shoulder"]"#)).unwrap_err();
    assert_eq!(err.kind(), FaultKind::ScriptExecution);
    match &err {
        ControllerError::Script(ScriptError::Failed {
            step,
            stdout,
            stderr,
            ..
        }) => {
            assert_eq!(*step, 3);
            assert_eq!(stdout, "partial output");
            assert_eq!(stderr, "ImportError");
        }
        other => panic!("unexpected {other:?}"),
    }

    // Steps 4 and 5 never reached the interpreter.
    assert_eq!(seen.lock().unwrap().as_slice(), &FIVE[..3]);
    assert_eq!(
        buffer.lines(),
        vec![
            ">>> a = 1",
            ">>> value:2",
            "2",
            ">>> import missing",
            "partial output",
            "------",
            "ImportError",
        ]
    );
    // Script failure happens before the claim.
    assert!(c.actuators().is_empty());
    assert_eq!(c.phase(), LifecyclePhase::Stopped);
}

#[test]
fn successful_script_runs_every_command_in_order() {
    let dir = registry(&[("shoulder", 0.0)]);
    let (factory, seen) = scripted(None);
    let buffer = SharedBuffer::new();
    let mut c = Controller::with_transcript(
        settings("arm", &FIVE),
        Transcript::from_writer(buffer.clone()),
        Recorder::new(1),
        factory,
    )
    .unwrap();

    c.init(&dir, &params(r#"["shoulder"]"#)).unwrap();
    assert_eq!(seen.lock().unwrap().as_slice(), &FIVE);
    let echoes: Vec<String> = buffer
        .lines()
        .into_iter()
        .filter(|l| l.starts_with(">>> "))
        .collect();
    assert_eq!(echoes.len(), FIVE.len());
}

#[test]
fn transcript_file_is_truncated_per_construction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("controller.out");
    std::fs::write(&path, "left over from last run\n").unwrap();

    let (factory, _) = scripted(None);
    let mut s = settings("arm", &["value:ok"]);
    s.transcript_path = Some(path.clone());
    let mut c = Controller::new(s, Recorder::new(1), factory).unwrap();
    c.init(&registry(&[("shoulder", 0.25)]), &params(r#"["shoulder"]"#))
        .unwrap();
    c.teardown();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("left over"));
    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        vec![">>> value:ok", "ok", "actuator_0 (shoulder) position: 0.25"]
    );
}

#[test]
fn unwritable_transcript_fails_construction() {
    let (factory, _) = scripted(None);
    let mut s = settings("arm", &[]);
    s.transcript_path = Some("/nonexistent/dir/controller.out".into());
    let err = Controller::new(s, Recorder::new(0), factory).unwrap_err();
    assert_eq!(err.kind(), FaultKind::Io);
}
