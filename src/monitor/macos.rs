//! Quartz event tap: listen-only observation of pointer and scroll events.
//!
//! Requires Accessibility permission in System Settings > Privacy & Security.

use std::sync::mpsc;
use std::time::Duration;

use core_foundation::runloop::{kCFRunLoopDefaultMode, CFRunLoop};
use core_graphics::event::{
    CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement, CGEventType,
};
use tracing::{debug, info};

use super::Origin;
use crate::cancel::CancelFlag;
use crate::error::AgentError;

/// kCGEventSourceUnixProcessID: the pid recorded on a posted event. Hardware
/// events report the kernel's pid, never ours.
const EVENT_SOURCE_UNIX_PROCESS_ID: u32 = 41;

/// Slice length for the bounded run-loop wait; the stop flag is re-checked
/// between slices.
const RUN_LOOP_SLICE: Duration = Duration::from_millis(250);

/// Install the tap and pump its run loop until `stop` is set.
///
/// Runs on the dedicated monitor thread: Quartz delivers tap callbacks to
/// the run loop of the thread that created the tap. Installation success or
/// failure is reported once through `ready_tx`.
pub(super) fn run_event_tap(
    own_pid: i64,
    foreign: CancelFlag,
    stop: CancelFlag,
    ready_tx: mpsc::Sender<Result<(), AgentError>>,
) {
    let events_of_interest = vec![
        CGEventType::MouseMoved,
        CGEventType::LeftMouseDown,
        CGEventType::RightMouseDown,
        CGEventType::OtherMouseDown,
        CGEventType::ScrollWheel,
    ];

    // Listen-only: observed events propagate to the rest of the system
    // unchanged. The callback's only side effect is the shared flag.
    let tap = match CGEventTap::new(
        CGEventTapLocation::HID,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::ListenOnly,
        events_of_interest,
        move |_proxy, _event_type, event| {
            let source_pid = event.get_integer_value_field(EVENT_SOURCE_UNIX_PROCESS_ID);
            if Origin::classify(source_pid, own_pid) == Origin::Foreign && !foreign.is_set() {
                info!("detected user input from pid {}; stopping movement", source_pid);
                foreign.set();
            }
            None
        },
    ) {
        Ok(tap) => tap,
        Err(()) => {
            let _ = ready_tx.send(Err(AgentError::TapUnavailable));
            return;
        }
    };

    unsafe {
        let loop_source = match tap.mach_port.create_runloop_source(0) {
            Ok(source) => source,
            Err(()) => {
                let _ = ready_tx.send(Err(AgentError::TapUnavailable));
                return;
            }
        };
        let run_loop = CFRunLoop::get_current();
        run_loop.add_source(&loop_source, kCFRunLoopDefaultMode);
        tap.enable();

        let _ = ready_tx.send(Ok(()));
        debug!("event tap installed");

        // Pump in bounded slices so a stop request is honored within
        // sub-second latency even when no input events arrive.
        while !stop.is_set() {
            CFRunLoop::run_in_mode(kCFRunLoopDefaultMode, RUN_LOOP_SLICE, true);
        }

        run_loop.remove_source(&loop_source, kCFRunLoopDefaultMode);
    }

    debug!("event tap released");
}
