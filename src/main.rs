//! jiggle - idle-prevention agent
//!
//! Keeps an interactive session alive by nudging the pointer to small random
//! offsets on a randomized cadence, and stops the instant a real user
//! touches the pointing device.

mod cancel;
mod config;
mod coordinator;
mod error;
mod monitor;
mod mover;
mod pointer;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::cancel::CancelFlag;
use crate::config::MovementConfig;
use crate::coordinator::Coordinator;
use crate::monitor::ActivityMonitor;
use crate::pointer::SystemPointer;

/// Application version.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Move the pointer randomly until the user touches the mouse or trackpad.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Seconds to wait before starting pointer movement.
    #[arg(long, default_value_t = 10.0)]
    start_delay: f64,

    /// Minimum seconds between moves.
    #[arg(long, default_value_t = 3.0)]
    min_interval: f64,

    /// Maximum seconds between moves.
    #[arg(long, default_value_t = 7.0)]
    max_interval: f64,

    /// Maximum pixels to move from the current position on each axis.
    #[arg(long, default_value_t = 120)]
    max_jitter: u32,

    /// Log level when RUST_LOG is not set (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn movement_config(&self) -> MovementConfig {
        MovementConfig {
            start_delay_secs: self.start_delay,
            min_interval_secs: self.min_interval,
            max_interval_secs: self.max_interval,
            max_jitter_px: self.max_jitter,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level)?;

    info!("starting jiggle v{}", VERSION);

    // Wiring: the monitor writes the shared flag, the mover and coordinator
    // read it. Validation happens before any platform hook is installed.
    let foreign = CancelFlag::new();
    let monitor = ActivityMonitor::new(foreign.clone());
    let mut coordinator = Coordinator::new(cli.movement_config(), SystemPointer::new(), monitor, foreign)?;

    coordinator.run().await?;
    Ok(())
}

/// Initialize tracing subscriber with the given log level.
fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}
