//! Fixed-rate cycle: read → update → write.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)`
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity` to the configured core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`.
//!
//! All four are no-ops without the `rt` feature except the prefault.
//!
//! ## Pacing
//! With `rt`, absolute `clock_nanosleep(TIMER_ABSTIME)` on `CLOCK_MONOTONIC`.
//! Without it, `std::thread::sleep` towards an absolute `Instant` deadline.
//! Either way a late cycle does not shift later deadlines; a cycle that ends
//! past its deadline counts as an overrun and the schedule resynchronizes.

use crate::lifecycle::ControllerPlugin;
use motus_common::hal::RobotHardware;
use motus_common::lifecycle::LifecyclePhase;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Overruns between two warnings after the first one.
const OVERRUN_WARN_EVERY: u64 = 1000;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for the average.
    pub sum_cycle_ns: i64,
    /// Cycles whose body ran past the period.
    pub overruns: u64,
    /// Maximum wake-up latency [ns].
    pub max_latency_ns: i64,
}

impl CycleStats {
    /// Zeroed stats.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record one cycle. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns += duration_ns;
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average cycle time [ns]; 0 before the first cycle.
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Cycle runner error.
#[derive(Debug, Error)]
pub enum CycleError {
    /// An RT setup call failed.
    #[error("RT setup failed: {0}")]
    RtSetup(String),

    /// The controller was not `Running` when the loop was entered.
    #[error("controller is {0}, expected Running")]
    NotRunning(LifecyclePhase),
}

// ─── RT Setup ───────────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KiB of stack so the first ticks do not page-fault.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xA5) };
    }
    std::hint::black_box(&buf);
}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// RT setup for the calling thread. Call after Init, before the loop.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    info!(
        "RT setup done (core {cpu_core}, priority {rt_priority}, rt feature: {})",
        cfg!(feature = "rt")
    );
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Drives a running controller against a hardware backend at a fixed rate.
#[derive(Debug)]
pub struct CycleRunner {
    cycle_time: Duration,
    tick_limit: Option<u64>,
    running: Arc<AtomicBool>,
    stats: CycleStats,
}

impl CycleRunner {
    /// Runner with period `cycle_time`, running until the flag is cleared.
    pub fn new(cycle_time: Duration) -> Self {
        Self {
            cycle_time,
            tick_limit: None,
            running: Arc::new(AtomicBool::new(true)),
            stats: CycleStats::new(),
        }
    }

    /// Stop on its own after `ticks` cycles.
    pub fn with_tick_limit(mut self, ticks: u64) -> Self {
        self.tick_limit = Some(ticks);
        self
    }

    /// Flag that keeps the loop alive; clear it to stop after the current cycle.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Timing statistics so far.
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Run until the flag is cleared or the tick limit is reached.
    ///
    /// # Errors
    /// - `CycleError::NotRunning` if the controller has not reached `Running`
    /// - `CycleError::RtSetup` if the monotonic clock cannot be read (`rt` only)
    pub fn run<P, H>(&mut self, plugin: &mut P, hardware: &mut H) -> Result<(), CycleError>
    where
        P: ControllerPlugin + ?Sized,
        H: RobotHardware + ?Sized,
    {
        let phase = plugin.phase();
        if !phase.is_operational() {
            return Err(CycleError::NotRunning(phase));
        }
        info!("Entering cycle loop, period {:?}", self.cycle_time);

        #[cfg(feature = "rt")]
        let result = self.run_rt_loop(plugin, hardware);
        #[cfg(not(feature = "rt"))]
        let result = self.run_sim_loop(plugin, hardware);

        info!(
            "Cycle loop left after {} cycles (avg {} ns, max {} ns, {} overruns)",
            self.stats.cycle_count,
            self.stats.avg_cycle_ns(),
            self.stats.max_cycle_ns,
            self.stats.overruns
        );
        result
    }

    fn keep_going(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.tick_limit.is_none_or(|limit| self.stats.cycle_count < limit)
    }

    #[inline]
    fn cycle_body<P, H>(&mut self, plugin: &mut P, hardware: &mut H, elapsed: Duration)
    where
        P: ControllerPlugin + ?Sized,
        H: RobotHardware + ?Sized,
    {
        hardware.read(elapsed);
        plugin.update(elapsed);
        hardware.write(elapsed);
    }

    fn note_overrun(&mut self, duration_ns: i64) {
        self.stats.overruns += 1;
        if self.stats.overruns == 1 || self.stats.overruns % OVERRUN_WARN_EVERY == 0 {
            warn!(
                "Cycle overrun: {} ns > {} ns budget ({} total)",
                duration_ns,
                self.cycle_time.as_nanos(),
                self.stats.overruns
            );
        }
    }

    #[cfg(not(feature = "rt"))]
    fn run_sim_loop<P, H>(&mut self, plugin: &mut P, hardware: &mut H) -> Result<(), CycleError>
    where
        P: ControllerPlugin + ?Sized,
        H: RobotHardware + ?Sized,
    {
        use std::time::Instant;

        let budget_ns = self.cycle_time.as_nanos() as i64;
        let mut next_wake = Instant::now();
        let mut last_start: Option<Instant> = None;

        while self.keep_going() {
            let cycle_start = Instant::now();
            let latency_ns = cycle_start.saturating_duration_since(next_wake).as_nanos() as i64;
            let elapsed = last_start.map_or(self.cycle_time, |t| cycle_start - t);
            last_start = Some(cycle_start);

            self.cycle_body(plugin, hardware, elapsed);

            let duration_ns = cycle_start.elapsed().as_nanos() as i64;
            self.stats.record(duration_ns, latency_ns);
            if duration_ns > budget_ns {
                self.note_overrun(duration_ns);
            }

            next_wake += self.cycle_time;
            let now = Instant::now();
            if next_wake > now {
                std::thread::sleep(next_wake - now);
            } else {
                next_wake = now;
            }
        }
        Ok(())
    }

    #[cfg(feature = "rt")]
    fn run_rt_loop<P, H>(&mut self, plugin: &mut P, hardware: &mut H) -> Result<(), CycleError>
    where
        P: ControllerPlugin + ?Sized,
        H: RobotHardware + ?Sized,
    {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let now = || clock_gettime(clock).map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")));
        let budget_ns = self.cycle_time.as_nanos() as i64;
        let mut next_wake = now()?;
        let mut last_start = None;

        while self.keep_going() {
            let cycle_start = now()?;
            let latency_ns = timespec_diff_ns(&cycle_start, &next_wake).max(0);
            let elapsed = last_start.map_or(self.cycle_time, |t| {
                Duration::from_nanos(timespec_diff_ns(&cycle_start, &t).max(0) as u64)
            });
            last_start = Some(cycle_start);

            self.cycle_body(plugin, hardware, elapsed);

            let cycle_end = now()?;
            let duration_ns = timespec_diff_ns(&cycle_end, &cycle_start);
            self.stats.record(duration_ns, latency_ns);
            if duration_ns > budget_ns {
                self.note_overrun(duration_ns);
            }

            next_wake = timespec_add_ns(next_wake, budget_ns);
            if timespec_diff_ns(&next_wake, &cycle_end) > 0 {
                // EINTR only shortens this cycle; the next deadline is absolute.
                let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
            } else {
                next_wake = cycle_end;
            }
        }
        Ok(())
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let total = ts.tv_nsec() + ns;
    TimeSpec::new(
        ts.tv_sec() + total.div_euclid(1_000_000_000),
        total.rem_euclid(1_000_000_000),
    )
}

/// `a - b` in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────
