//! # Cross-platform teardown signal routing.
//!
//! One process-wide registry forwards termination signals to a single
//! replaceable callback. [`register_teardown_handler`] installs the OS-level
//! listener at most once per process; calling it again only swaps the
//! forwarding target (last registration wins — the listener itself is never
//! stacked).
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]
//!
//! ## Rules
//! - Each signal delivery forwards to the current callback exactly once.
//! - The callback runs on the listener task; it must not block. Set a flag
//!   or cancel a token and let the run loop observe it.

use std::sync::{Arc, Mutex, OnceLock};

type TeardownFn = Arc<dyn Fn() + Send + Sync + 'static>;

/// Replaceable forwarding target for signal deliveries.
static TEARDOWN: OnceLock<Mutex<Option<TeardownFn>>> = OnceLock::new();

/// Guards the one-time spawn of the OS signal listener.
static LISTENER: OnceLock<()> = OnceLock::new();

/// Registers `handler` as the process teardown callback.
///
/// The first call spawns the signal listener; later calls replace the
/// callback without reinstalling OS handlers. Must be called from within a
/// tokio runtime.
pub fn register_teardown_handler<F>(handler: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let slot = TEARDOWN.get_or_init(|| Mutex::new(None));
    *slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(handler));

    LISTENER.get_or_init(|| {
        tokio::spawn(async {
            loop {
                if wait_for_shutdown_signal().await.is_err() {
                    break;
                }
                notify_teardown();
            }
        });
    });
}

/// Forwards one delivery to the currently registered callback, if any.
///
/// This is the dispatch point the signal listener goes through; it is public
/// so the forwarding semantics can be exercised without raising real
/// signals.
pub fn notify_teardown() {
    let handler = TEARDOWN
        .get()
        .and_then(|slot| slot.lock().unwrap_or_else(|e| e.into_inner()).clone());
    if let Some(handler) = handler {
        handler();
    }
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal
/// registration fails.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal
/// registration fails.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn last_registration_wins() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));

        {
            let first = first.clone();
            register_teardown_handler(move || {
                first.fetch_add(1, Ordering::SeqCst);
            });
        }
        {
            let second = second.clone();
            register_teardown_handler(move || {
                second.fetch_add(1, Ordering::SeqCst);
            });
        }

        notify_teardown();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        notify_teardown();
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }
}
