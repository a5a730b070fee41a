//! Background frame decoding.
//!
//! A small pool of worker threads walks every `(window, time)` slot, asks
//! the [`FrameSource`] to decode it, and posts each result on a channel.
//! Completions arrive in arbitrary order; the render thread drains them
//! with [`FrameLoader::drain`] and applies them one at a time.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::frame::Frame;
use super::source::{DecodeError, FrameSource};
use crate::error::FramewallError;

/// One decode completion.
#[derive(Debug)]
pub struct LoadedFrame {
    /// Window the frame belongs to.
    pub window: usize,
    /// Time index within the window's sequence.
    pub time: usize,
    /// Decoded frame or the reason decoding failed.
    pub result: Result<Frame, DecodeError>,
}

/// Which slots a loader should decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    /// Windows to decode, each for every time index.
    pub windows: Vec<usize>,
    /// Frames per window.
    pub num_timepoints: usize,
}

impl LoadPlan {
    /// Every window in `0..num_windows`.
    #[must_use]
    pub fn all(num_windows: usize, num_timepoints: usize) -> Self {
        Self {
            windows: (0..num_windows).collect(),
            num_timepoints,
        }
    }

    /// Number of frames the plan decodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len() * self.num_timepoints
    }

    /// Whether the plan decodes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot coordinates of job `k`.
    fn job(&self, k: usize) -> (usize, usize) {
        let nt = self.num_timepoints.max(1);
        (self.windows[k / nt], k % nt)
    }
}

/// Pool of decode workers feeding a completion channel.
pub struct FrameLoader {
    receiver: Receiver<LoadedFrame>,
    cancel: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
    total: usize,
}

impl FrameLoader {
    /// Start decoding every slot in `plan` on `threads` workers (at least
    /// one).
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::ThreadSpawn`] if a worker cannot be
    /// spawned. Workers already running are cancelled.
    pub fn spawn(
        source: Arc<dyn FrameSource>,
        plan: LoadPlan,
        threads: usize,
    ) -> Result<Self, FramewallError> {
        let (sender, receiver) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let next_job = Arc::new(AtomicUsize::new(0));
        let plan = Arc::new(plan);
        let total = plan.len();
        let threads = threads.max(1).min(total.max(1));

        let mut loader = Self {
            receiver,
            cancel,
            workers: Vec::with_capacity(threads),
            total,
        };

        for i in 0..threads {
            let worker = Worker {
                source: Arc::clone(&source),
                plan: Arc::clone(&plan),
                next_job: Arc::clone(&next_job),
                cancel: Arc::clone(&loader.cancel),
                sender: sender.clone(),
            };
            let handle = thread::Builder::new()
                .name(format!("frame-decode-{i}"))
                .spawn(move || worker.run())
                .map_err(FramewallError::ThreadSpawn)?;
            loader.workers.push(handle);
        }

        log::info!("decoding {total} frames on {threads} threads");
        Ok(loader)
    }

    /// Completions received since the last call, in arrival order.
    pub fn drain(&self) -> Vec<LoadedFrame> {
        self.receiver.try_iter().collect()
    }

    /// Number of frames this loader was asked to decode.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Stop handing out new jobs and wait for workers to exit.
    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Release);
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::warn!("frame decode worker panicked");
            }
        }
    }
}

impl Drop for FrameLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct Worker {
    source: Arc<dyn FrameSource>,
    plan: Arc<LoadPlan>,
    next_job: Arc<AtomicUsize>,
    cancel: Arc<AtomicBool>,
    sender: Sender<LoadedFrame>,
}

impl Worker {
    fn run(self) {
        let total = self.plan.len();
        while !self.cancel.load(Ordering::Acquire) {
            let k = self.next_job.fetch_add(1, Ordering::Relaxed);
            if k >= total {
                break;
            }
            let (window, time) = self.plan.job(k);
            let result = self.source.decode(window, time);
            if let Err(e) = &result {
                log::warn!("frame ({window}, {time}) failed: {e}");
            }
            let loaded = LoadedFrame {
                window,
                time,
                result,
            };
            if self.sender.send(loaded).is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::frames::frame::{FrameSize, PixelFormat};
    use crate::frames::source::NoiseSource;

    fn drain_all(loader: &FrameLoader) -> Vec<LoadedFrame> {
        let mut out = Vec::new();
        let deadline =
            std::time::Instant::now() + std::time::Duration::from_secs(10);
        while out.len() < loader.total() && std::time::Instant::now() < deadline
        {
            out.extend(loader.drain());
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        out
    }

    #[test]
    fn every_slot_is_delivered_once() {
        let source = Arc::new(NoiseSource::new(
            FrameSize::new(4, 4),
            PixelFormat::Luminance8,
            1,
        ));
        let loader =
            FrameLoader::spawn(source, LoadPlan::all(3, 5), 4).unwrap();
        let frames = drain_all(&loader);
        assert_eq!(frames.len(), 15);

        let slots: HashSet<(usize, usize)> =
            frames.iter().map(|f| (f.window, f.time)).collect();
        assert_eq!(slots.len(), 15);
        assert!(frames.iter().all(|f| f.result.is_ok()));
    }

    #[test]
    fn partial_plan_only_decodes_listed_windows() {
        let source = Arc::new(NoiseSource::new(
            FrameSize::new(2, 2),
            PixelFormat::AlphaF32,
            9,
        ));
        let plan = LoadPlan {
            windows: vec![2, 4],
            num_timepoints: 2,
        };
        let loader = FrameLoader::spawn(source, plan, 2).unwrap();
        let frames = drain_all(&loader);
        let windows: HashSet<usize> = frames.iter().map(|f| f.window).collect();
        assert_eq!(windows, HashSet::from([2, 4]));
    }

    #[test]
    fn empty_plan_finishes_immediately() {
        let source = Arc::new(NoiseSource::new(
            FrameSize::new(2, 2),
            PixelFormat::Luminance8,
            0,
        ));
        let mut loader =
            FrameLoader::spawn(source, LoadPlan::all(0, 3), 4).unwrap();
        loader.cancel();
        assert!(loader.drain().is_empty());
    }
}
