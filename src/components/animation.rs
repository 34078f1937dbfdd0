//! Time-bounded drawables.
//!
//! An animation lives on the canvas for a fixed [`Duration`]. Its start
//! instant is captured once when the canvas activates it; every frame derives
//! its state from the time elapsed since then, so painting stays idempotent.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use crate::components::drawable::Drawable;

/// Start instant plus fixed lifetime of an animation.
#[derive(Debug)]
pub struct AnimationClock {
    duration: Duration,
    started: OnceLock<Instant>,
}

impl AnimationClock {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: OnceLock::new(),
        }
    }

    /// Record the start instant. Later calls keep the first instant.
    pub fn start(&self) {
        let _ = self.started.set(Instant::now());
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started.get().copied()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time since start, zero when not started yet.
    pub fn elapsed(&self) -> Duration {
        self.started
            .get()
            .map(Instant::elapsed)
            .unwrap_or_default()
    }

    pub fn is_finished(&self) -> bool {
        self.started.get().is_some() && self.elapsed() >= self.duration
    }
}

/// A drawable with a fixed lifetime on the canvas.
pub trait Animation: Drawable {
    fn clock(&self) -> &AnimationClock;

    fn start(&self) {
        self.clock().start();
    }

    fn duration(&self) -> Duration {
        self.clock().duration()
    }

    fn elapsed(&self) -> Duration {
        self.clock().elapsed()
    }
}
