//! Passive observation of the system-wide input-event stream.
//!
//! The monitor's single job is to tell genuine user input apart from the
//! moves this agent synthesizes, and to set the shared cancellation flag on
//! the first genuine event. It never alters or suppresses events.

#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(target_os = "macos"))]
mod unsupported;

use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cancel::CancelFlag;
use crate::error::AgentError;

#[cfg(target_os = "macos")]
use macos::run_event_tap;
#[cfg(not(target_os = "macos"))]
use unsupported::run_event_tap;

/// How long `start` waits for the tap thread to report installation.
const INSTALL_TIMEOUT: Duration = Duration::from_secs(2);

/// Who produced an observed input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The event carries this process's identity: one of our own moves.
    Synthetic,
    /// Any other source, i.e. a real user.
    Foreign,
}

impl Origin {
    pub fn classify(source_pid: i64, own_pid: i64) -> Self {
        if source_pid == own_pid {
            Origin::Synthetic
        } else {
            Origin::Foreign
        }
    }
}

/// Seam between the coordinator and the platform tap, so the state machine
/// can be exercised without input-monitoring permission.
pub trait InputMonitor {
    fn start(&mut self) -> Result<(), AgentError>;
    fn stop(&mut self);
}

/// Watches the global input stream from a dedicated thread and sets the
/// shared flag on the first foreign event.
pub struct ActivityMonitor {
    /// Shared cancellation flag; this monitor is its sole writer.
    foreign: CancelFlag,
    /// Private stop request for the tap thread.
    stop: CancelFlag,
    thread: Option<JoinHandle<()>>,
}

impl ActivityMonitor {
    pub fn new(foreign: CancelFlag) -> Self {
        Self {
            foreign,
            stop: CancelFlag::new(),
            thread: None,
        }
    }
}

impl InputMonitor for ActivityMonitor {
    /// Install the event tap on a dedicated thread.
    ///
    /// The thread reports installation success or failure over a handshake
    /// channel; waiting is bounded so a monitor that will never fire cannot
    /// hang its caller. On `TapUnavailable` the caller must behave as if
    /// foreign activity were already observed.
    fn start(&mut self) -> Result<(), AgentError> {
        let own_pid = std::process::id() as i64;
        let foreign = self.foreign.clone();
        let stop = self.stop.clone();
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("activity-monitor".to_string())
            .spawn(move || {
                run_event_tap(own_pid, foreign, stop, ready_tx);
            })
            .map_err(|_| AgentError::TapUnavailable)?;
        self.thread = Some(handle);

        match ready_rx.recv_timeout(INSTALL_TIMEOUT) {
            Ok(Ok(())) => {
                info!("activity monitor watching for user input (pid {})", own_pid);
                Ok(())
            }
            Ok(Err(err)) => Err(err),
            Err(_) => {
                warn!("event tap installation did not report back in time");
                Err(AgentError::TapUnavailable)
            }
        }
    }

    /// Tear down the tap. Idempotent and safe to call when `start` failed or
    /// was never called.
    fn stop(&mut self) {
        self.stop.set();
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("activity monitor thread panicked during shutdown");
            }
            debug!("activity monitor stopped");
        }
    }
}

impl Drop for ActivityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_own_pid_as_synthetic() {
        assert_eq!(Origin::classify(4321, 4321), Origin::Synthetic);
    }

    #[test]
    fn classifies_other_pids_as_foreign() {
        assert_eq!(Origin::classify(0, 4321), Origin::Foreign);
        assert_eq!(Origin::classify(1234, 4321), Origin::Foreign);
    }

    #[test]
    fn stop_before_start_is_safe() {
        let mut monitor = ActivityMonitor::new(CancelFlag::new());
        monitor.stop();
        monitor.stop();
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn start_fails_safe_on_unsupported_platforms() {
        let foreign = CancelFlag::new();
        let mut monitor = ActivityMonitor::new(foreign.clone());
        let err = monitor.start().unwrap_err();
        assert!(matches!(err, AgentError::TapUnavailable));
        // The flag is the caller's to set; the failed start must not hang
        // or leave a live thread behind.
        monitor.stop();
        assert!(!foreign.is_set());
    }
}
