//! Fallback for platforms without a global input-event tap.

use std::sync::mpsc;

use crate::cancel::CancelFlag;
use crate::error::AgentError;

/// Report `TapUnavailable` immediately; the caller applies the fail-safe.
pub(super) fn run_event_tap(
    _own_pid: i64,
    _foreign: CancelFlag,
    _stop: CancelFlag,
    ready_tx: mpsc::Sender<Result<(), AgentError>>,
) {
    let _ = ready_tx.send(Err(AgentError::TapUnavailable));
}
