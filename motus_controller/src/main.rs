//! # Motus Controller
//!
//! Standalone controller process against simulated hardware.
//!
//! Loads one TOML file, brings up the interpreter worker, runs the startup
//! script, claims the configured actuators, aligns the hold-position device
//! and enters the fixed-rate cycle until Ctrl-C or `--ticks` cycles.

use clap::Parser;
use motus_common::config::LogLevel;
use motus_common::hal::RobotHardware;
use motus_controller::builtin::{HoldPosition, null_factory};
use motus_controller::config::{ControllerConfig, load_config};
use motus_controller::cycle::{CycleRunner, rt_setup};
use motus_controller::{Controller, ControllerPlugin};
use motus_hal::SimulatedHardware;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Motus Controller - fixed-rate actuator control with scripted startup
#[derive(Parser, Debug)]
#[command(name = "motus_controller")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Fixed-rate actuator controller with scripted startup")]
struct Args {
    /// Path to the controller TOML file.
    #[arg(long, default_value = "config/controller.toml")]
    config: PathBuf,

    /// CPU core to pin the cycle thread to.
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority.
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Stop after this many cycles.
    #[arg(long)]
    ticks: Option<u64>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = load_config(&args.config);
    let level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);

    info!("Motus Controller v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = config
        .map_err(|e| -> Box<dyn std::error::Error> {
            format!("{}: {e}", args.config.display()).into()
        })
        .and_then(|config| run(&args, config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Motus Controller shutdown complete");
}

fn run(args: &Args, config: ControllerConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Config OK: service={}, cycle_time={}µs, joints={}",
        config.shared.service_name,
        config.controller.cycle_time_us,
        config.hardware.joints.len()
    );

    let mut hardware = SimulatedHardware::from_config(&config.hardware)?;
    let device = HoldPosition::new(config.device);
    let mut controller = Controller::new(config.settings(), device, null_factory())?;

    controller.init(hardware.directory(), &config.parameters)?;
    controller.starting()?;

    rt_setup(args.cpu_core, args.rt_priority)?;

    let mut runner = CycleRunner::new(config.cycle_time());
    if let Some(ticks) = args.ticks {
        runner = runner.with_tick_limit(ticks);
    }

    let running = runner.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::Release);
    })?;

    let result = runner.run(&mut controller, &mut hardware);
    controller.teardown();
    result?;
    Ok(())
}

fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
