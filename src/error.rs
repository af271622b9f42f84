//! Error taxonomy for a single agent run.

use thiserror::Error;

/// Failures the agent can hit between argument validation and shutdown.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The movement configuration is unusable. Raised before any platform
    /// hook is installed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The platform refused to install the input event tap, usually because
    /// the binary lacks input-monitoring permission.
    #[error(
        "could not install the input event tap; grant this binary Accessibility \
         access in System Settings > Privacy & Security > Accessibility and retry"
    )]
    TapUnavailable,

    /// Querying or synthesizing a pointer event failed. A platform that
    /// rejects synthetic events cannot fulfill the agent's purpose, so this
    /// is fatal to the run.
    #[error("pointer dispatch failed: {0}")]
    DispatchFailure(String),
}
