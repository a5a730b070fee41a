//! Render-loop pacing and rate reporting.

use web_time::{Duration, Instant};

/// Render-loop timing with a smoothed FPS estimate, optional frame limiting,
/// and a periodic report hook.
///
/// This measures how often the scene is *drawn*; playback speed is owned
/// by the animation clock and does not depend on it.
#[derive(Debug)]
pub struct FrameTiming {
    /// Minimum frame duration (zero = unlimited).
    min_frame_duration: Duration,
    last_frame: Instant,
    last_report: Instant,
    /// Smoothed FPS using exponential moving average.
    smoothed_fps: f32,
    /// Weight of the newest sample (0.0-1.0).
    smoothing: f32,
    frames_since_report: u32,
}

impl FrameTiming {
    /// Create a timer limiting to `target_fps` (0 = unlimited).
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        Self::starting_at(target_fps, Instant::now())
    }

    fn starting_at(target_fps: u32, now: Instant) -> Self {
        let min_frame_duration = if target_fps > 0 {
            Duration::from_secs_f64(1.0 / f64::from(target_fps))
        } else {
            Duration::ZERO
        };

        Self {
            min_frame_duration,
            last_frame: now,
            last_report: now,
            smoothed_fps: 60.0,
            smoothing: 0.05,
            frames_since_report: 0,
        }
    }

    /// Whether enough time has passed since the last frame to draw again.
    #[must_use]
    pub fn should_render(&self) -> bool {
        self.last_frame.elapsed() >= self.min_frame_duration
    }

    /// Record a drawn frame.
    pub fn end_frame(&mut self) {
        self.record_frame(Instant::now());
    }

    fn record_frame(&mut self, now: Instant) {
        let frame_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frames_since_report = self.frames_since_report.saturating_add(1);

        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
    }

    /// Frames drawn since the previous report, if `interval` has elapsed.
    /// Resets the report window when it returns `Some`.
    pub fn take_report(&mut self, interval: Duration) -> Option<u32> {
        self.take_report_at(interval, Instant::now())
    }

    fn take_report_at(
        &mut self,
        interval: Duration,
        now: Instant,
    ) -> Option<u32> {
        if now.duration_since(self.last_report) < interval {
            return None;
        }
        self.last_report = now;
        Some(std::mem::take(&mut self.frames_since_report))
    }

    /// Smoothed render rate.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_always_renders() {
        let timing = FrameTiming::new(0);
        assert!(timing.should_render());
    }

    #[test]
    fn smoothing_moves_toward_observed_rate() {
        let start = Instant::now();
        let mut timing = FrameTiming::starting_at(0, start);
        let mut now = start;
        for _ in 0..400 {
            now += Duration::from_millis(10);
            timing.record_frame(now);
        }
        assert!((timing.fps() - 100.0).abs() < 1.0, "fps = {}", timing.fps());
    }

    #[test]
    fn report_counts_frames_per_window() {
        let start = Instant::now();
        let mut timing = FrameTiming::starting_at(0, start);
        let interval = Duration::from_secs(1);

        for i in 1..=5 {
            timing.record_frame(start + Duration::from_millis(100 * i));
        }
        assert_eq!(
            timing.take_report_at(interval, start + Duration::from_millis(500)),
            None
        );
        assert_eq!(
            timing.take_report_at(interval, start + Duration::from_secs(1)),
            Some(5)
        );
        assert_eq!(
            timing.take_report_at(interval, start + Duration::from_secs(2)),
            Some(0)
        );
    }
}
