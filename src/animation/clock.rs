//! Fixed-rate playback clock.
//!
//! The clock owns a background task that advances a cyclic frame index at a
//! fixed wall-clock period, independent of how often the scene is rendered.
//! Renderers only read [`AnimationClock::current_index`].

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use web_time::{Duration, Instant};

use crate::error::FramewallError;

/// Default playback rate in frames per second.
pub const DEFAULT_FPS: f32 = 30.0;

/// State shared between the clock handle and its ticking task.
#[derive(Debug)]
struct ClockState {
    num_timepoints: usize,
    index: AtomicUsize,
    ticks: AtomicU64,
    running: AtomicBool,
}

impl ClockState {
    /// Advance the index by one step. Only one writer exists at a time.
    fn advance(&self) {
        let next =
            (self.index.load(Ordering::Relaxed) + 1) % self.num_timepoints;
        self.index.store(next, Ordering::Release);
        let _ = self.ticks.fetch_add(1, Ordering::Relaxed);
    }
}

/// Cyclic frame-index clock driven by an owned periodic task.
///
/// `start` may be called once; `stop` (also run on drop) ends the task and
/// is safe to call whether or not the clock ever started.
#[derive(Debug)]
pub struct AnimationClock {
    state: Arc<ClockState>,
    period: Duration,
    worker: Option<JoinHandle<()>>,
    started: bool,
}

impl AnimationClock {
    /// Clock cycling through `num_timepoints` indices at `fps` (clamped to
    /// >= 0.1). A zero timepoint count is treated as one.
    #[must_use]
    pub fn new(num_timepoints: usize, fps: f32) -> Self {
        let fps = if fps.is_finite() { fps.max(0.1) } else { DEFAULT_FPS };
        Self {
            state: Arc::new(ClockState {
                num_timepoints: num_timepoints.max(1),
                index: AtomicUsize::new(0),
                ticks: AtomicU64::new(0),
                running: AtomicBool::new(false),
            }),
            period: Duration::from_secs_f64(1.0 / f64::from(fps)),
            worker: None,
            started: false,
        }
    }

    /// Begin ticking on a background thread.
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::ClockAlreadyStarted`] on a second call and
    /// [`FramewallError::ThreadSpawn`] if the task cannot be spawned.
    pub fn start(&mut self) -> Result<(), FramewallError> {
        if self.started {
            return Err(FramewallError::ClockAlreadyStarted);
        }

        self.state.running.store(true, Ordering::Release);
        let state = Arc::clone(&self.state);
        let period = self.period;
        let worker = thread::Builder::new()
            .name("animation-clock".into())
            .spawn(move || run_clock(&state, period))
            .map_err(|e| {
                self.state.running.store(false, Ordering::Release);
                FramewallError::ThreadSpawn(e)
            })?;

        self.worker = Some(worker);
        self.started = true;
        log::info!(
            "animation clock started: {} timepoints every {:?}",
            self.state.num_timepoints,
            self.period
        );
        Ok(())
    }

    /// Stop the background task and wait for it to exit.
    pub fn stop(&mut self) {
        self.state.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            worker.thread().unpark();
            if worker.join().is_err() {
                log::warn!("animation clock task panicked");
            }
            log::info!(
                "animation clock stopped after {} ticks",
                self.ticks()
            );
        }
    }

    /// Advance one step by hand, for hosts that drive playback themselves.
    ///
    /// Ignored while the background task is running so the index keeps a
    /// single writer.
    pub fn step(&self) {
        if !self.is_running() {
            self.state.advance();
        }
    }

    /// Frame index every window should display right now.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.state.index.load(Ordering::Acquire)
    }

    /// Total steps taken since construction.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.state.ticks.load(Ordering::Relaxed)
    }

    /// Number of indices in one cycle.
    #[must_use]
    pub fn num_timepoints(&self) -> usize {
        self.state.num_timepoints
    }

    /// Period between steps.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether `start` has been called.
    #[must_use]
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Whether the background task is currently ticking.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }
}

impl Drop for AnimationClock {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Number of whole periods contained in `elapsed`.
fn periods_elapsed(elapsed: Duration, period: Duration) -> u128 {
    let period = period.as_nanos().max(1);
    elapsed.as_nanos() / period
}

/// Tick loop: steps are scheduled against a fixed epoch, so late wakeups
/// are caught up instead of accumulating drift.
fn run_clock(state: &ClockState, period: Duration) {
    let epoch = Instant::now();
    let mut emitted: u128 = 0;

    while state.running.load(Ordering::Acquire) {
        let now = Instant::now();
        let due = periods_elapsed(now.duration_since(epoch), period);
        while emitted < due {
            state.advance();
            emitted += 1;
        }

        let next_nanos = period.as_nanos() * (emitted + 1);
        let next = epoch
            + Duration::from_nanos(u64::try_from(next_nanos).unwrap_or(u64::MAX));
        let wait = next.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            thread::park_timeout(wait);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_returns_to_zero() {
        for n in 1..=7 {
            let clock = AnimationClock::new(n, DEFAULT_FPS);
            assert_eq!(clock.current_index(), 0);
            for _ in 0..n {
                clock.step();
            }
            assert_eq!(clock.current_index(), 0, "n = {n}");
            assert_eq!(clock.ticks(), n as u64);
        }
    }

    #[test]
    fn five_steps_over_three_timepoints() {
        let clock = AnimationClock::new(3, DEFAULT_FPS);
        for _ in 0..5 {
            clock.step();
        }
        assert_eq!(clock.current_index(), 2);
    }

    #[test]
    fn zero_timepoints_is_a_single_frame() {
        let clock = AnimationClock::new(0, DEFAULT_FPS);
        clock.step();
        assert_eq!(clock.current_index(), 0);
        assert_eq!(clock.num_timepoints(), 1);
    }

    #[test]
    fn default_period_is_thirty_fps() {
        let clock = AnimationClock::new(10, DEFAULT_FPS);
        let expected = Duration::from_secs_f64(1.0 / 30.0);
        assert_eq!(clock.period(), expected);
    }

    #[test]
    fn stop_without_start_is_safe() {
        let mut clock = AnimationClock::new(4, DEFAULT_FPS);
        clock.stop();
        clock.stop();
        assert!(!clock.is_running());
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut clock = AnimationClock::new(4, 1.0);
        assert!(clock.start().is_ok());
        assert!(matches!(
            clock.start(),
            Err(FramewallError::ClockAlreadyStarted)
        ));
        clock.stop();
    }

    #[test]
    fn background_task_advances_and_stops() {
        let mut clock = AnimationClock::new(5, 500.0);
        clock.start().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(60));
        clock.stop();

        let ticks = clock.ticks();
        assert!(ticks > 0);
        assert_eq!(clock.current_index(), (ticks % 5) as usize);

        std::thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(clock.ticks(), ticks, "no ticks after stop");
    }

    #[test]
    fn manual_step_ignored_while_running() {
        let mut clock = AnimationClock::new(1000, 0.1);
        clock.start().unwrap();
        let before = clock.ticks();
        clock.step();
        assert_eq!(clock.ticks(), before);
        clock.stop();
    }

    #[test]
    fn elapsed_periods_floor() {
        let period = Duration::from_millis(10);
        assert_eq!(periods_elapsed(Duration::from_millis(9), period), 0);
        assert_eq!(periods_elapsed(Duration::from_millis(10), period), 1);
        assert_eq!(periods_elapsed(Duration::from_millis(95), period), 9);
    }
}
