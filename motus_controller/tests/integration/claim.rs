//! Actuator claim through a full Init.

use motus_common::hal::CommandInterface;
use motus_common::lifecycle::LifecyclePhase;
use motus_controller::claim::{ClaimError, claim};
use motus_controller::{Controller, ControllerError, ControllerPlugin, FaultKind};

use super::support::{Recorder, params, registry, scripted, settings};

#[test]
fn all_names_resolvable_claims_in_order() {
    let dir = registry(&[("shoulder", 0.1), ("elbow", 0.2), ("wrist", 0.3)]);
    let (factory, _) = scripted(None);
    let mut c = Controller::new(settings("arm", &["x = 1"]), Recorder::new(2), factory).unwrap();

    c.init(&dir, &params(r#"["shoulder", "elbow"]"#)).unwrap();
    assert_eq!(c.phase(), LifecyclePhase::Initialized);
    assert_eq!(c.actuators().names(), vec!["shoulder", "elbow"]);
}

#[test]
fn unresolvable_name_leaves_nothing_claimed() {
    let dir = registry(&[("shoulder", 0.0), ("elbow", 0.0)]);
    let (factory, _) = scripted(None);
    let mut c = Controller::new(settings("arm", &[]), Recorder::new(2), factory).unwrap();

    let err = c.init(&dir, &params(r#"["shoulder", "ghost"]"#)).unwrap_err();
    assert_eq!(err.kind(), FaultKind::ResourceUnavailable);
    assert!(err.to_string().contains("ghost"));
    match &err {
        ControllerError::Claim(e) => assert_eq!(e.offending_name(), Some("ghost")),
        other => panic!("unexpected {other:?}"),
    }
    assert!(c.actuators().is_empty());
    assert_eq!(c.phase(), LifecyclePhase::Stopped);
}

#[test]
fn failing_position_does_not_matter() {
    let names = ["a", "b", "c", "d", "e"];
    let dir = registry(&names.map(|n| (n, 0.0)));
    for failing in 0..names.len() {
        let mut list: Vec<String> = names.iter().map(|n| format!("\"{n}\"")).collect();
        list[failing] = "\"ghost\"".to_string();
        let (factory, _) = scripted(None);
        let mut c = Controller::new(settings("arm", &[]), Recorder::new(5), factory).unwrap();

        assert!(c.init(&dir, &params(&format!("[{}]", list.join(", ")))).is_err());
        assert!(c.actuators().is_empty(), "partial claim with ghost at {failing}");
    }
}

#[test]
fn claim_count_matches_list_length() {
    let joints: Vec<(String, f64)> = (0..12).map(|i| (format!("j{i}"), 0.0)).collect();
    let refs: Vec<(&str, f64)> = joints.iter().map(|(n, p)| (n.as_str(), *p)).collect();
    let dir = registry(&refs);
    for n in [0, 1, 5, 12] {
        let names: Vec<String> = (0..n).rev().map(|i| format!("j{i}")).collect();
        let set = claim(&dir, &names, CommandInterface::Position).unwrap();
        assert_eq!(set.len(), n);
        let got: Vec<&str> = set.names();
        assert_eq!(got, names.iter().map(String::as_str).collect::<Vec<_>>());
    }
}

#[test]
fn non_string_entry_fails_before_any_lookup() {
    // "ghost" would fail a lookup; the format check must win.
    let dir = registry(&[("shoulder", 0.0)]);
    let (factory, _) = scripted(None);
    let mut c = Controller::new(settings("arm", &[]), Recorder::new(2), factory).unwrap();

    let err = c.init(&dir, &params(r#"["ghost", 42]"#)).unwrap_err();
    assert_eq!(err.kind(), FaultKind::Configuration);
    assert!(matches!(
        err,
        ControllerError::Claim(ClaimError::NonStringEntry { index: 1, .. })
    ));
}

#[test]
fn missing_list_is_a_configuration_fault() {
    let dir = registry(&[("shoulder", 0.0)]);
    let (factory, _) = scripted(None);
    let mut c = Controller::new(settings("arm", &[]), Recorder::new(1), factory).unwrap();
    let empty: toml::Table = toml::Table::new();
    assert_eq!(c.init(&dir, &empty).unwrap_err().kind(), FaultKind::Configuration);
}

#[test]
fn wrong_interface_is_resource_unavailable() {
    let mut dir = registry(&[("shoulder", 0.0)]);
    dir.register("gripper", CommandInterface::Effort, 0.0).unwrap();
    let (factory, _) = scripted(None);
    let mut c = Controller::new(settings("arm", &[]), Recorder::new(2), factory).unwrap();

    let err = c.init(&dir, &params(r#"["shoulder", "gripper"]"#)).unwrap_err();
    assert_eq!(err.kind(), FaultKind::ResourceUnavailable);
    assert!(err.to_string().contains("gripper"));
}
