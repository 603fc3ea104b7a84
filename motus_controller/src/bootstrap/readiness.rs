//! One-shot readiness rendezvous.
//!
//! A single-slot channel: the worker's [`ReadySignal`] sends once, and
//! dropping it unsent disconnects the waiter. The [`ReadyWaiter`] remembers a
//! delivered signal, so every wait after the first returns immediately.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::cell::Cell;
use std::time::Duration;

/// Result of waiting on a [`ReadyWaiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The signal fired.
    Ready,
    /// The signal was dropped without firing.
    Abandoned,
    /// The bound elapsed while still pending.
    TimedOut,
}

/// Firing half. Consumed by [`ReadySignal::fire`].
#[derive(Debug)]
pub struct ReadySignal {
    tx: Sender<()>,
}

/// Waiting half.
#[derive(Debug)]
pub struct ReadyWaiter {
    rx: Receiver<()>,
    ready: Cell<bool>,
}

/// Create a connected signal/waiter pair.
pub fn one_shot() -> (ReadySignal, ReadyWaiter) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    (
        ReadySignal { tx },
        ReadyWaiter {
            rx,
            ready: Cell::new(false),
        },
    )
}

impl ReadySignal {
    /// Mark ready and wake the waiter.
    pub fn fire(self) {
        // The waiter may already have given up.
        let _ = self.tx.send(());
    }
}

impl ReadyWaiter {
    /// Block until the signal fires, is dropped, or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> WaitOutcome {
        if self.ready.get() {
            return WaitOutcome::Ready;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(()) => {
                self.ready.set(true);
                WaitOutcome::Ready
            }
            Err(RecvTimeoutError::Disconnected) => WaitOutcome::Abandoned,
            Err(RecvTimeoutError::Timeout) => WaitOutcome::TimedOut,
        }
    }

    /// Non-blocking check.
    pub fn is_ready(&self) -> bool {
        if !self.ready.get() && matches!(self.rx.try_recv(), Ok(())) {
            self.ready.set(true);
        }
        self.ready.get()
    }

    /// `true` once the signal was dropped without firing.
    pub fn is_abandoned(&self) -> bool {
        !self.is_ready() && matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }
}
