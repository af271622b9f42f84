//! One-shot cancellation flag shared between the monitor and the mover.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clonable handle over a shared boolean condition.
///
/// The flag is monotonic for readers: once `set`, every clone observes it set
/// until the end of the run. The single exception is the startup-discard
/// window, where the mover calls the crate-private [`CancelFlag::clear`]
/// exactly once before the movement loop begins.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Idempotent; there is no way back for readers.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Reset the flag. Only the startup-discard window may do this.
    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
