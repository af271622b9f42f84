//! Pointer control with platform-specific implementations.

#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(target_os = "macos"))]
mod unsupported;

use crate::error::AgentError;

/// Pixel extents of the primary display, fetched once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenBounds {
    pub width: u32,
    pub height: u32,
}

/// A location in screen coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Narrow interface over the platform's pointer collaborators: display
/// geometry, position query, and synthetic move dispatch.
pub trait Pointer: Send + Sync {
    /// Pixel width and height of the primary display.
    fn bounds(&self) -> Result<ScreenBounds, AgentError>;

    /// Current pointer location in screen coordinates.
    fn position(&self) -> Result<Position, AgentError>;

    /// Synthesize a pointer-move to `target`, tagged with this process's
    /// identity so the activity monitor can classify it as our own.
    fn move_to(&self, target: Position) -> Result<(), AgentError>;
}

#[cfg(target_os = "macos")]
pub use macos::SystemPointer;
#[cfg(not(target_os = "macos"))]
pub use unsupported::SystemPointer;
