//! Top-level state machine for one run: starts the monitor and the mover,
//! propagates cancellation, and guarantees the monitor is torn down however
//! the run ends.

use tracing::{debug, error, info};

use crate::cancel::CancelFlag;
use crate::config::MovementConfig;
use crate::error::AgentError;
use crate::monitor::InputMonitor;
use crate::mover::CursorMover;
use crate::pointer::Pointer;

/// Lifecycle of a run. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// How a run ended. None of these are error conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A real user touched the pointing device.
    ForeignInput,
    /// The process received an external interrupt request.
    Interrupted,
    /// The input monitor could not be installed; the fail-safe ended the
    /// run before any movement.
    MonitorUnavailable,
}

pub struct Coordinator<P, M> {
    config: MovementConfig,
    pointer: P,
    monitor: M,
    foreign: CancelFlag,
    state: RunState,
}

impl<P, M> Coordinator<P, M>
where
    P: Pointer,
    M: InputMonitor,
{
    /// Validate the configuration and assemble a run. `monitor` must share
    /// `foreign`: the monitor writes it, the mover and this coordinator
    /// read it.
    pub fn new(
        config: MovementConfig,
        pointer: P,
        monitor: M,
        foreign: CancelFlag,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        Ok(Self {
            config,
            pointer,
            monitor,
            foreign,
            state: RunState::Idle,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Drive the run to completion. The monitor is stopped on every exit
    /// path, so no listening hook outlives the run.
    pub async fn run(&mut self) -> Result<RunOutcome, AgentError> {
        self.transition(RunState::Starting);
        let result = self.drive().await;

        self.transition(RunState::Stopping);
        self.monitor.stop();
        self.transition(RunState::Stopped);

        match &result {
            Ok(RunOutcome::ForeignInput) => info!("user input detected; run complete"),
            Ok(RunOutcome::Interrupted) => info!("interrupt received; run complete"),
            Ok(RunOutcome::MonitorUnavailable) => info!("input monitor unavailable; run complete"),
            Err(err) => error!("run failed: {}", err),
        }
        result
    }

    async fn drive(&mut self) -> Result<RunOutcome, AgentError> {
        let bounds = self.pointer.bounds()?;
        debug!("primary display is {}x{}", bounds.width, bounds.height);

        if let Err(err) = self.monitor.start() {
            // Fail safe: behave as if foreign activity were already
            // observed, instead of jiggling with nobody watching.
            error!("{}", err);
            self.foreign.set();
            self.transition(RunState::Running);
            return Ok(RunOutcome::MonitorUnavailable);
        }
        self.transition(RunState::Running);

        let mover = CursorMover::new(self.config.clone(), bounds, self.foreign.clone());
        tokio::select! {
            result = mover.run(&self.pointer) => {
                result?;
                Ok(RunOutcome::ForeignInput)
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received; stopping");
                Ok(RunOutcome::Interrupted)
            }
        }
    }

    fn transition(&mut self, next: RunState) {
        debug!("run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
