//! Fallback pointer control for platforms without a Quartz-style event API.

use super::{Pointer, Position, ScreenBounds};
use crate::error::AgentError;

/// Stub that fails every operation; the run ends before any movement.
pub struct SystemPointer;

impl SystemPointer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemPointer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pointer for SystemPointer {
    fn bounds(&self) -> Result<ScreenBounds, AgentError> {
        Err(AgentError::DispatchFailure(
            "pointer control is not supported on this platform".into(),
        ))
    }

    fn position(&self) -> Result<Position, AgentError> {
        Err(AgentError::DispatchFailure(
            "pointer control is not supported on this platform".into(),
        ))
    }

    fn move_to(&self, _target: Position) -> Result<(), AgentError> {
        Err(AgentError::DispatchFailure(
            "pointer control is not supported on this platform".into(),
        ))
    }
}
