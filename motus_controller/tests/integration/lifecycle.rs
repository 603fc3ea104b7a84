//! Starting and Update through the full lifecycle.

use motus_common::hal::{ResourceDirectory, RobotHardware};
use motus_common::lifecycle::LifecyclePhase;
use motus_controller::builtin::{HoldDeviceConfig, HoldPosition, null_factory};
use motus_controller::cycle::CycleRunner;
use motus_controller::{Controller, ControllerPlugin, FaultKind};
use motus_hal::{HardwareConfig, SimJointConfig, SimulatedHardware};
use std::time::Duration;

use super::support::{Recorder, params, registry, scripted, settings};

const TICK: Duration = Duration::from_millis(1);

#[test]
fn out_of_range_alignment_still_runs() {
    let dir = registry(&[("shoulder", 0.5), ("elbow", 4.0)]);
    let (factory, _) = scripted(None);
    let mut device = Recorder::new(2);
    device.limit = 3.0;
    let mut c = Controller::new(settings("arm", &[]), device, factory).unwrap();

    c.init(&dir, &params(r#"["shoulder", "elbow"]"#)).unwrap();
    c.starting().unwrap();

    assert_eq!(c.phase(), LifecyclePhase::Running);
    assert_eq!(c.device().aligned.as_deref(), Some(&[0.5, 4.0][..]));
    assert_eq!(c.last_fault().map(|f| f.kind), Some(FaultKind::StateAlignment));
}

#[test]
fn one_write_per_tick_in_order() {
    const T: u64 = 250;
    let dir = registry(&[("a", 0.0), ("b", 0.0), ("c", 0.0)]);
    let (factory, _) = scripted(None);
    let mut c = Controller::new(settings("arm", &[]), Recorder::new(3), factory).unwrap();
    c.init(&dir, &params(r#"["a", "b", "c"]"#)).unwrap();
    c.starting().unwrap();

    for tick in 1..=T {
        c.update(TICK);
        for (i, handle) in c.actuators().iter().enumerate() {
            assert_eq!(handle.command_seq(), tick);
            assert_eq!(handle.command(), (tick * 100 + i as u64) as f64);
        }
    }
    assert_eq!(c.stats().ticks, T);
    assert_eq!(c.stats().command_mismatches, 0);
}

#[test]
fn update_is_ignored_outside_running() {
    let dir = registry(&[("a", 0.0)]);
    let (factory, _) = scripted(None);
    let mut c = Controller::new(settings("arm", &[]), Recorder::new(1), factory).unwrap();
    c.init(&dir, &params(r#"["a"]"#)).unwrap();

    c.update(TICK);
    assert_eq!(c.actuators().as_slice()[0].command_seq(), 0);
    assert_eq!(c.device().tick, 0);

    c.starting().unwrap();
    c.teardown();
    c.update(TICK);
    assert_eq!(c.actuators().as_slice()[0].command_seq(), 0);
    assert_eq!(c.stats().rejected_ticks, 2);
}

#[test]
fn starting_after_failed_init_is_rejected() {
    let dir = registry(&[]);
    let (factory, _) = scripted(None);
    let mut c = Controller::new(settings("arm", &[]), Recorder::new(1), factory).unwrap();
    assert!(c.init(&dir, &params(r#"["ghost"]"#)).is_err());
    assert_eq!(c.starting().unwrap_err().kind(), FaultKind::Lifecycle);
    assert_eq!(c.phase(), LifecyclePhase::Stopped);
}

#[test]
fn simulated_robot_holds_position_through_the_cycle_runner() {
    let mut hw_config = HardwareConfig::default();
    hw_config.joints.push(SimJointConfig::position("shoulder", 0.3));
    hw_config.joints.push(SimJointConfig::position("elbow", -0.7));
    let mut hardware = SimulatedHardware::from_config(&hw_config).unwrap();

    let device = HoldPosition::new(HoldDeviceConfig::default());
    let mut c = Controller::new(settings("sim", &["import startup"]), device, null_factory()).unwrap();
    c.init(hardware.directory(), &params(r#"["elbow", "shoulder"]"#))
        .unwrap();
    c.starting().unwrap();
    assert_eq!(c.device().targets(), &[-0.7, 0.3]);

    let mut runner = CycleRunner::new(Duration::from_micros(100)).with_tick_limit(50);
    runner.run(&mut c, &mut hardware).unwrap();

    assert_eq!(c.stats().ticks, 50);
    let registry = hardware.registry();
    assert!((registry.state("shoulder").unwrap().position() - 0.3).abs() < 1e-9);
    assert!((registry.state("elbow").unwrap().position() + 0.7).abs() < 1e-9);
    assert_eq!(registry.names(), vec!["shoulder", "elbow"]);
}
