//! # Orphan process monitor.
//!
//! A modular input is always a child of the host orchestrator. If the host
//! dies, the input must notice and wind down instead of collecting forever
//! into a void. [`OrphanMonitor`] polls parent liveness from a background
//! task and fires a callback once when the parent disappears.
//!
//! ## State machine
//! ```text
//! Stopped ──start(callback)──► Running ──parent gone──► callback(), Stopped
//!    ▲                            │
//!    └──────────stop()────────────┘        (no auto-restart)
//! ```
//!
//! ## Rules
//! - `start` is idempotent: a second call while Running is a no-op.
//! - `stop` is fire-and-forget; the background task observes it within one
//!   poll interval. Stopping an already-stopped monitor is a no-op.
//! - The callback fires **at most once**, even when `stop` races a
//!   detection: the Running flag is claimed with a compare-exchange, so
//!   either the callback wins and the later `stop` is a no-op, or `stop`
//!   wins and the callback never fires.
//!
//! On non-Unix platforms parent liveness cannot be observed this way and
//! the monitor never reports orphaning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

type LivenessProbe = Arc<dyn Fn() -> bool + Send + Sync>;

/// Watches the parent process from a periodic background task.
pub struct OrphanMonitor {
    running: Arc<AtomicBool>,
    stop: Mutex<Option<CancellationToken>>,
    interval: Duration,
    probe: LivenessProbe,
}

impl OrphanMonitor {
    /// Creates a monitor polling at `interval`. The identity of the parent
    /// process is captured here, before any chance of reparenting.
    pub fn new(interval: Duration) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            stop: Mutex::new(None),
            interval,
            probe: default_probe(),
        }
    }

    /// Replaces the parent-liveness probe.
    ///
    /// The probe returns `true` while the parent is alive. Useful for tests
    /// and for platforms with their own notion of "my supervisor is gone".
    pub fn with_probe<F>(mut self, probe: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.probe = Arc::new(probe);
        self
    }

    /// Returns `true` while the background loop is active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Starts the background loop, invoking `callback` once if the parent
    /// disappears. No-op when already running.
    pub fn start<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let token = CancellationToken::new();
        *self
            .stop
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(token.clone());

        let running = Arc::clone(&self.running);
        let probe = Arc::clone(&self.probe);
        let interval = self.interval;
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        if !probe() {
                            // Claim the Running flag; a concurrent stop() may
                            // have beaten us to it, in which case stay silent.
                            if running
                                .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
                                .is_ok()
                            {
                                callback();
                            }
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Requests the background loop to end at its next check point. No-op
    /// when already stopped. Returns without waiting; the loop exits within
    /// one poll interval.
    pub fn stop(&self) {
        if self
            .running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            if let Some(token) = self
                .stop
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .take()
            {
                token.cancel();
            }
        }
    }
}

#[cfg(unix)]
fn default_probe() -> LivenessProbe {
    let original_parent = std::os::unix::process::parent_id();
    Arc::new(move || std::os::unix::process::parent_id() == original_parent)
}

#[cfg(not(unix))]
fn default_probe() -> LivenessProbe {
    Arc::new(|| true)
}
