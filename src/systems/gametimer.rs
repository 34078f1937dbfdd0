//! Fixed-rate scheduler driving the render task.
//!
//! Each scheduled task gets its own thread. The task runs immediately, then
//! once per period against an absolute schedule, so short ticks do not drift.
//! Ticks missed because a run overran are skipped instead of replayed in a
//! burst.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use log::{info, trace, warn};

use crate::systems::canvas::RenderTask;

struct Worker {
    // Never sent on; dropping it wakes and stops the worker.
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Runs units of work at `fps` invocations per second until cancelled or
/// dropped.
pub struct GameTimer {
    fps: u32,
    period: Duration,
    workers: Vec<Worker>,
}

impl GameTimer {
    /// A timer ticking every `1000 / fps` milliseconds (at least 1 ms).
    pub fn new(fps: u32) -> Result<Self, String> {
        if fps == 0 {
            return Err("GameTimer needs a frame rate above zero".to_string());
        }
        let period = Duration::from_millis((1000 / u64::from(fps)).max(1));
        Ok(Self {
            fps,
            period,
            workers: Vec::new(),
        })
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of tasks currently scheduled.
    pub fn scheduled(&self) -> usize {
        self.workers.len()
    }

    /// Start repainting a canvas at the timer's rate.
    pub fn schedule_render_task(&mut self, task: RenderTask) {
        info!("Rendering at {} fps ({:?} per frame)", self.fps, self.period);
        self.schedule(move || task.run());
    }

    /// Start running `task` at the timer's rate, beginning now.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: FnMut() + Send + 'static,
    {
        let (stop, stop_rx) = bounded::<()>(0);
        let period = self.period;
        let handle = thread::spawn(move || fixed_rate_thread(period, stop_rx, task));
        self.workers.push(Worker { stop, handle });
    }

    /// Stop every scheduled task and wait for the threads to finish.
    pub fn cancel(&mut self) {
        for Worker { stop, handle } in self.workers.drain(..) {
            drop(stop);
            if handle.thread().id() == thread::current().id() {
                continue;
            }
            if handle.join().is_err() {
                warn!("GameTimer task panicked");
            }
        }
    }
}

impl Drop for GameTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn fixed_rate_thread<F: FnMut()>(period: Duration, stop: Receiver<()>, mut task: F) {
    let mut next = Instant::now();
    loop {
        task();
        next += period;
        let now = Instant::now();
        if next < now {
            let behind = (now - next).as_nanos() / period.as_nanos();
            let skipped = u32::try_from(behind).unwrap_or(u32::MAX).saturating_add(1);
            trace!("Tick overran, skipping {} tick(s)", skipped);
            next += period * skipped;
        }
        match stop.recv_deadline(next) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_zero_fps_is_rejected() {
        assert!(GameTimer::new(0).is_err());
    }

    #[test]
    fn test_period_from_fps() {
        assert_eq!(GameTimer::new(60).unwrap().period(), Duration::from_millis(16));
        assert_eq!(GameTimer::new(4).unwrap().period(), Duration::from_millis(250));
        assert_eq!(GameTimer::new(5000).unwrap().period(), Duration::from_millis(1));
    }

    #[test]
    fn test_runs_immediately_then_repeats() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut timer = GameTimer::new(50).unwrap();
        let c = count.clone();
        timer.schedule(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        thread::sleep(Duration::from_millis(5));
        assert!(count.load(Ordering::SeqCst) >= 1);
        thread::sleep(Duration::from_millis(200));
        assert!(count.load(Ordering::SeqCst) >= 4);
        timer.cancel();
        assert_eq!(timer.scheduled(), 0);
    }

    #[test]
    fn test_cancel_stops_ticking() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut timer = GameTimer::new(100).unwrap();
        let c = count.clone();
        timer.schedule(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        thread::sleep(Duration::from_millis(50));
        timer.cancel();
        let after_cancel = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
    }

    #[test]
    fn test_overrun_skips_instead_of_bursting() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut timer = GameTimer::new(100).unwrap();
        let c = count.clone();
        timer.schedule(move || {
            // Each run takes three periods.
            c.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(30));
        });
        thread::sleep(Duration::from_millis(200));
        timer.cancel();
        // Roughly 200 / 40 runs; a catch-up policy would approach 20.
        assert!(count.load(Ordering::SeqCst) <= 10);
    }
}
