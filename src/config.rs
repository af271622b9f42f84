//! Movement cadence configuration, built once from CLI input.

use std::time::Duration;

use crate::error::AgentError;

/// Knobs for the movement loop. Immutable for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct MovementConfig {
    /// Seconds to wait before the first pointer move.
    pub start_delay_secs: f64,
    /// Minimum seconds between moves.
    pub min_interval_secs: f64,
    /// Maximum seconds between moves.
    pub max_interval_secs: f64,
    /// Largest pixel offset applied to each axis per move.
    pub max_jitter_px: u32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            start_delay_secs: 10.0,
            min_interval_secs: 3.0,
            max_interval_secs: 7.0,
            max_jitter_px: 120,
        }
    }
}

impl MovementConfig {
    pub fn start_delay(&self) -> Duration {
        Duration::from_secs_f64(self.start_delay_secs)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_secs_f64(self.min_interval_secs)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_secs_f64(self.max_interval_secs)
    }

    /// Validate configuration values. Runs before any platform interaction.
    pub fn validate(&self) -> Result<(), AgentError> {
        if !self.start_delay_secs.is_finite() || self.start_delay_secs < 0.0 {
            return Err(AgentError::InvalidConfig(format!(
                "start-delay must be a non-negative number of seconds, got {}",
                self.start_delay_secs
            )));
        }
        if !self.min_interval_secs.is_finite() || self.min_interval_secs <= 0.0 {
            return Err(AgentError::InvalidConfig(format!(
                "min-interval must be a positive number of seconds, got {}",
                self.min_interval_secs
            )));
        }
        if !self.max_interval_secs.is_finite() {
            return Err(AgentError::InvalidConfig(format!(
                "max-interval must be a number of seconds, got {}",
                self.max_interval_secs
            )));
        }
        if self.min_interval_secs > self.max_interval_secs {
            return Err(AgentError::InvalidConfig(format!(
                "min-interval ({}) cannot be greater than max-interval ({})",
                self.min_interval_secs, self.max_interval_secs
            )));
        }
        Ok(())
    }
}
