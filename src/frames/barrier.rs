//! One-shot load barrier gating playback on frame completion.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::{Duration, Instant};

/// What to do when some frames fail to decode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Open once every frame has either loaded or failed; missing frames
    /// are skipped at draw time.
    #[default]
    SkipMissing,
    /// Wait for every frame to load. A single failure stalls playback
    /// forever unless a stall timeout is configured.
    Stall,
}

/// Why the barrier opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyReason {
    /// Every frame loaded.
    Complete,
    /// Every frame settled, some of them failed.
    Settled {
        /// Frames that failed to decode.
        failed: usize,
    },
    /// No completion arrived within the stall timeout.
    TimedOut {
        /// Frames loaded when the timeout fired.
        loaded: usize,
    },
}

/// Snapshot of loading progress for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    /// Frames stored.
    pub loaded: usize,
    /// Frames that failed to decode.
    pub failed: usize,
    /// Frames expected.
    pub total: usize,
}

impl LoadProgress {
    /// Fraction of frames settled, in [0, 1].
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            (self.loaded + self.failed) as f32 / self.total as f32
        }
    }
}

/// One-shot latch that opens when the expected frames have arrived.
///
/// Once open it never closes. `loaded + failed` never exceeds `total`.
#[derive(Debug)]
pub struct LoadBarrier {
    total: usize,
    loaded: usize,
    failed: usize,
    policy: FailurePolicy,
    stall_timeout: Option<Duration>,
    last_progress: Instant,
    ready: Option<ReadyReason>,
}

impl LoadBarrier {
    /// Barrier expecting `total` frames. A zero total opens immediately.
    #[must_use]
    pub fn new(
        total: usize,
        policy: FailurePolicy,
        stall_timeout: Option<Duration>,
    ) -> Self {
        Self::with_start_time(total, policy, stall_timeout, Instant::now())
    }

    /// Barrier whose stall timer starts at `start`.
    #[must_use]
    pub fn with_start_time(
        total: usize,
        policy: FailurePolicy,
        stall_timeout: Option<Duration>,
        start: Instant,
    ) -> Self {
        let mut barrier = Self {
            total,
            loaded: 0,
            failed: 0,
            policy,
            stall_timeout,
            last_progress: start,
            ready: None,
        };
        let _ = barrier.check();
        barrier
    }

    /// Record a successfully stored frame. Returns the reason if this call
    /// opened the barrier.
    pub fn record_loaded(&mut self, now: Instant) -> Option<ReadyReason> {
        if self.loaded + self.failed < self.total {
            self.loaded += 1;
            self.last_progress = now;
        }
        self.check()
    }

    /// Record a frame that failed to decode. Returns the reason if this
    /// call opened the barrier.
    pub fn record_failed(&mut self, now: Instant) -> Option<ReadyReason> {
        if self.loaded + self.failed < self.total {
            self.failed += 1;
            self.last_progress = now;
        }
        self.check()
    }

    /// Record that a slot previously counted as failed has now loaded.
    /// Returns the reason if this call opened the barrier.
    pub fn record_recovered(&mut self, now: Instant) -> Option<ReadyReason> {
        if self.failed > 0 {
            self.failed -= 1;
            self.loaded += 1;
            self.last_progress = now;
        }
        self.check()
    }

    /// Expect `extra` more frames. An open barrier stays open; a closed one
    /// now also waits for the new frames.
    pub fn extend(&mut self, extra: usize, now: Instant) {
        self.total += extra;
        if extra > 0 {
            self.last_progress = now;
        }
    }

    /// Open the barrier if the stall timeout has elapsed since the last
    /// completion. Returns the reason if this call opened it.
    pub fn poll_timeout(&mut self, now: Instant) -> Option<ReadyReason> {
        if self.ready.is_some() {
            return None;
        }
        let timeout = self.stall_timeout?;
        if now.saturating_duration_since(self.last_progress) < timeout {
            return None;
        }
        let reason = ReadyReason::TimedOut {
            loaded: self.loaded,
        };
        self.ready = Some(reason);
        Some(reason)
    }

    fn check(&mut self) -> Option<ReadyReason> {
        if self.ready.is_some() {
            return None;
        }
        let reason = if self.loaded == self.total {
            ReadyReason::Complete
        } else if self.policy == FailurePolicy::SkipMissing
            && self.loaded + self.failed == self.total
        {
            ReadyReason::Settled {
                failed: self.failed,
            }
        } else {
            return None;
        };
        self.ready = Some(reason);
        Some(reason)
    }

    /// Whether the barrier has opened.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.is_some()
    }

    /// Why the barrier opened, if it has.
    #[must_use]
    pub fn ready_reason(&self) -> Option<ReadyReason> {
        self.ready
    }

    /// Current loading progress.
    #[must_use]
    pub fn progress(&self) -> LoadProgress {
        LoadProgress {
            loaded: self.loaded,
            failed: self.failed,
            total: self.total,
        }
    }
}
