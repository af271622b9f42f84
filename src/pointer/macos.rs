//! Pointer control via Quartz: CGDisplay for geometry, CGEvent for position
//! queries and synthetic move dispatch.

use core_graphics::display::CGDisplay;
use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

use super::{Pointer, Position, ScreenBounds};
use crate::error::AgentError;

/// kCGEventSourceUnixProcessID: the pid recorded on a posted event.
const EVENT_SOURCE_UNIX_PROCESS_ID: u32 = 41;

/// Quartz-backed pointer control.
pub struct SystemPointer {
    own_pid: i64,
}

impl SystemPointer {
    pub fn new() -> Self {
        Self {
            own_pid: std::process::id() as i64,
        }
    }

    fn event_source(&self) -> Result<CGEventSource, AgentError> {
        CGEventSource::new(CGEventSourceStateID::HIDSystemState)
            .map_err(|_| AgentError::DispatchFailure("could not create event source".into()))
    }
}

impl Default for SystemPointer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pointer for SystemPointer {
    fn bounds(&self) -> Result<ScreenBounds, AgentError> {
        let display = CGDisplay::main();
        let width = display.pixels_wide() as u32;
        let height = display.pixels_high() as u32;
        if width == 0 || height == 0 {
            return Err(AgentError::DispatchFailure(
                "main display reported zero pixel size".into(),
            ));
        }
        Ok(ScreenBounds { width, height })
    }

    fn position(&self) -> Result<Position, AgentError> {
        let source = self.event_source()?;
        let event = CGEvent::new(source)
            .map_err(|_| AgentError::DispatchFailure("could not query pointer position".into()))?;
        let location = event.location();
        Ok(Position {
            x: location.x,
            y: location.y,
        })
    }

    fn move_to(&self, target: Position) -> Result<(), AgentError> {
        let source = self.event_source()?;
        let event = CGEvent::new_mouse_event(
            source,
            CGEventType::MouseMoved,
            CGPoint::new(target.x, target.y),
            CGMouseButton::Left,
        )
        .map_err(|_| AgentError::DispatchFailure("could not create mouse-move event".into()))?;

        // Stamp our pid so the tap classifies this move as our own.
        event.set_integer_value_field(EVENT_SOURCE_UNIX_PROCESS_ID, self.own_pid);
        event.post(CGEventTapLocation::HID);
        Ok(())
    }
}
