//! The movement cadence: jittered synthetic moves separated by randomized,
//! cancellation-aware sleeps.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{sleep, Instant};
use tracing::info;

use crate::cancel::CancelFlag;
use crate::config::MovementConfig;
use crate::error::AgentError;
use crate::pointer::{Pointer, Position, ScreenBounds};

/// Granularity at which waits re-check the cancellation flag.
const POLL_TICK: Duration = Duration::from_millis(100);

/// Drives the visible jiggle behavior until the shared flag is set.
pub struct CursorMover {
    config: MovementConfig,
    bounds: ScreenBounds,
    foreign: CancelFlag,
}

impl CursorMover {
    pub fn new(config: MovementConfig, bounds: ScreenBounds, foreign: CancelFlag) -> Self {
        Self {
            config,
            bounds,
            foreign,
        }
    }

    /// Run the startup grace period and then the movement loop.
    ///
    /// Returns `Ok(())` when the cancellation flag ended the loop; pointer
    /// errors are fatal and propagate.
    pub async fn run<P: Pointer>(&self, pointer: &P) -> Result<(), AgentError> {
        self.run_with_rng(pointer, StdRng::from_entropy()).await
    }

    pub(crate) async fn run_with_rng<P, R>(&self, pointer: &P, mut rng: R) -> Result<(), AgentError>
    where
        P: Pointer,
        R: Rng,
    {
        self.startup_grace().await;

        info!(
            "starting pointer movement with intervals between {:.1}s and {:.1}s",
            self.config.min_interval_secs, self.config.max_interval_secs
        );

        loop {
            if self.foreign.is_set() {
                break;
            }

            let current = pointer.position()?;
            let target = jitter_target(current, self.bounds, self.config.max_jitter_px, &mut rng);
            info!(
                "moving pointer from ({:.0}, {:.0}) to ({:.0}, {:.0})",
                current.x, current.y, target.x, target.y
            );
            pointer.move_to(target)?;

            let interval = self.sample_interval(&mut rng);
            if wait_with_checks(interval, &self.foreign).await {
                break;
            }
        }

        info!("pointer movement stopped");
        Ok(())
    }

    /// Wait out the startup delay, then discard any flag activity that raced
    /// in. The agent must not abort before it ever moved the pointer just
    /// because startup noise tripped the monitor.
    async fn startup_grace(&self) {
        let delay = self.config.start_delay();
        if !delay.is_zero() {
            info!(
                "waiting {:.1}s before starting pointer movement",
                self.config.start_delay_secs
            );
            let deadline = Instant::now() + delay;
            while Instant::now() < deadline {
                let remaining = deadline - Instant::now();
                sleep(remaining.min(POLL_TICK)).await;
            }
        }
        if self.foreign.is_set() {
            info!("input detected during startup delay; ignoring and continuing");
            self.foreign.clear();
        }
    }

    fn sample_interval<R: Rng>(&self, rng: &mut R) -> Duration {
        let secs = rng.gen_range(self.config.min_interval_secs..=self.config.max_interval_secs);
        Duration::from_secs_f64(secs)
    }
}

/// Compute a jittered target near `current`, clamped so it never leaves the
/// visible display.
fn jitter_target<R: Rng>(
    current: Position,
    bounds: ScreenBounds,
    max_jitter_px: u32,
    rng: &mut R,
) -> Position {
    let jitter = max_jitter_px as i32;
    let dx = rng.gen_range(-jitter..=jitter);
    let dy = rng.gen_range(-jitter..=jitter);
    Position {
        x: (current.x + dx as f64).clamp(0.0, (bounds.width - 1) as f64),
        y: (current.y + dy as f64).clamp(0.0, (bounds.height - 1) as f64),
    }
}

/// Sleep up to `duration`, re-checking `flag` every poll tick. Returns true
/// as soon as the flag is observed set.
async fn wait_with_checks(duration: Duration, flag: &CancelFlag) -> bool {
    let deadline = Instant::now() + duration;
    while Instant::now() < deadline {
        if flag.is_set() {
            return true;
        }
        let remaining = deadline - Instant::now();
        sleep(remaining.min(POLL_TICK)).await;
    }
    flag.is_set()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const BOUNDS: ScreenBounds = ScreenBounds {
        width: 1920,
        height: 1080,
    };

    /// Pointer stub that records dispatched moves and can cancel the run or
    /// fail after a set number of them.
    struct FakePointer {
        position: Position,
        moves: Mutex<Vec<Position>>,
        cancel_after: Option<(usize, CancelFlag)>,
        fail_after: Option<usize>,
    }

    impl FakePointer {
        fn at(x: f64, y: f64) -> Self {
            Self {
                position: Position { x, y },
                moves: Mutex::new(Vec::new()),
                cancel_after: None,
                fail_after: None,
            }
        }

        fn cancel_after(mut self, moves: usize, flag: CancelFlag) -> Self {
            self.cancel_after = Some((moves, flag));
            self
        }

        fn fail_after(mut self, moves: usize) -> Self {
            self.fail_after = Some(moves);
            self
        }

        fn move_count(&self) -> usize {
            self.moves.lock().unwrap().len()
        }
    }

    impl Pointer for FakePointer {
        fn bounds(&self) -> Result<ScreenBounds, AgentError> {
            Ok(BOUNDS)
        }

        fn position(&self) -> Result<Position, AgentError> {
            Ok(self.position)
        }

        fn move_to(&self, target: Position) -> Result<(), AgentError> {
            let mut moves = self.moves.lock().unwrap();
            if let Some(limit) = self.fail_after {
                if moves.len() >= limit {
                    return Err(AgentError::DispatchFailure("injection refused".into()));
                }
            }
            moves.push(target);
            if let Some((limit, flag)) = &self.cancel_after {
                if moves.len() >= *limit {
                    flag.set();
                }
            }
            Ok(())
        }
    }

    fn config(start_delay: f64, min: f64, max: f64, jitter: u32) -> MovementConfig {
        MovementConfig {
            start_delay_secs: start_delay,
            min_interval_secs: min,
            max_interval_secs: max,
            max_jitter_px: jitter,
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn jitter_targets_stay_on_screen() {
        let mut rng = rng();
        let positions = [
            Position { x: 0.0, y: 0.0 },
            Position { x: 5.0, y: 5.0 },
            Position { x: 960.0, y: 540.0 },
            Position { x: 1919.0, y: 1079.0 },
            Position { x: 3000.0, y: -50.0 },
        ];
        for jitter in [0, 1, 120, 5000] {
            for current in positions {
                for _ in 0..200 {
                    let target = jitter_target(current, BOUNDS, jitter, &mut rng);
                    assert!(target.x >= 0.0 && target.x <= 1919.0, "x = {}", target.x);
                    assert!(target.y >= 0.0 && target.y <= 1079.0, "y = {}", target.y);
                }
            }
        }
    }

    #[test]
    fn zero_jitter_keeps_the_pointer_in_place() {
        let mut rng = rng();
        let current = Position { x: 500.0, y: 500.0 };
        for _ in 0..50 {
            let target = jitter_target(current, BOUNDS, 0, &mut rng);
            assert_eq!(target, current);
        }
    }

    #[test]
    fn sampled_intervals_stay_in_bounds() {
        let mut rng = rng();
        let mover = CursorMover::new(config(0.0, 3.0, 7.0, 120), BOUNDS, CancelFlag::new());
        for _ in 0..500 {
            let interval = mover.sample_interval(&mut rng);
            assert!(interval >= Duration::from_secs(3));
            assert!(interval <= Duration::from_secs(7));
        }
    }

    #[test]
    fn degenerate_interval_bounds_sample_exactly() {
        let mut rng = rng();
        let mover = CursorMover::new(config(0.0, 1.0, 1.0, 0), BOUNDS, CancelFlag::new());
        for _ in 0..20 {
            assert_eq!(mover.sample_interval(&mut rng), Duration::from_secs(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wait_returns_immediately_when_flag_is_already_set() {
        let flag = CancelFlag::new();
        flag.set();
        let started = Instant::now();
        assert!(wait_with_checks(Duration::from_secs(60), &flag).await);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_runs_the_full_duration_when_flag_stays_unset() {
        let flag = CancelFlag::new();
        let started = Instant::now();
        assert!(!wait_with_checks(Duration::from_secs(3), &flag).await);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_observes_a_concurrent_set_within_one_poll_tick() {
        let flag = CancelFlag::new();
        let setter = flag.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(1050)).await;
            setter.set();
        });
        let started = Instant::now();
        assert!(wait_with_checks(Duration::from_secs(60), &flag).await);
        assert!(started.elapsed() <= Duration::from_millis(1050) + POLL_TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_jitter_run_dispatches_only_the_current_position() {
        let flag = CancelFlag::new();
        let pointer = FakePointer::at(500.0, 500.0).cancel_after(3, flag.clone());
        let mover = CursorMover::new(config(0.0, 1.0, 1.0, 0), BOUNDS, flag);

        mover.run_with_rng(&pointer, rng()).await.unwrap();

        let moves = pointer.moves.lock().unwrap();
        assert_eq!(moves.len(), 3);
        for target in moves.iter() {
            assert_eq!(*target, Position { x: 500.0, y: 500.0 });
        }
    }

    #[tokio::test(start_paused = true)]
    async fn no_dispatch_happens_after_cancellation() {
        let flag = CancelFlag::new();
        let pointer = FakePointer::at(100.0, 100.0).cancel_after(2, flag.clone());
        let mover = CursorMover::new(config(0.0, 0.5, 0.5, 10), BOUNDS, flag.clone());

        mover.run_with_rng(&pointer, rng()).await.unwrap();

        // The canceling move is the last one; the loop exits on the very
        // next poll without another dispatch.
        assert_eq!(pointer.move_count(), 2);
        assert!(flag.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn flag_set_during_startup_delay_is_discarded() {
        let flag = CancelFlag::new();
        flag.set();
        let pointer = FakePointer::at(100.0, 100.0).cancel_after(1, flag.clone());
        let mover = CursorMover::new(config(0.5, 0.1, 0.1, 10), BOUNDS, flag.clone());

        let started = Instant::now();
        mover.run_with_rng(&pointer, rng()).await.unwrap();

        // Movement began at the end of the grace period despite the early
        // flag, and only the pointer stub's later set ended the run.
        assert!(pointer.move_count() >= 1);
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_between_moves_stops_the_loop_within_one_tick() {
        let flag = CancelFlag::new();
        let setter = flag.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(250)).await;
            setter.set();
        });
        let pointer = FakePointer::at(100.0, 100.0);
        let mover = CursorMover::new(config(0.0, 0.1, 0.1, 10), BOUNDS, flag);

        mover.run_with_rng(&pointer, rng()).await.unwrap();

        // Moves at 0.0s, 0.1s and 0.2s; the 0.25s set is observed on the
        // next poll, before a fourth dispatch.
        assert_eq!(pointer.move_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_failure_is_fatal() {
        let flag = CancelFlag::new();
        let pointer = FakePointer::at(100.0, 100.0).fail_after(1);
        let mover = CursorMover::new(config(0.0, 0.1, 0.1, 10), BOUNDS, flag);

        let err = mover.run_with_rng(&pointer, rng()).await.unwrap_err();
        assert!(matches!(err, AgentError::DispatchFailure(_)));
        assert_eq!(pointer.move_count(), 1);
    }
}
