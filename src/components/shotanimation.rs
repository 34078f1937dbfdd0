//! Flight of a single projectile.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::components::animation::{Animation, AnimationClock};
use crate::components::drawable::{Drawable, Visibility};
use crate::model::shot::Shot;
use crate::resources::pixmap::{AssetError, Pixmap, Surface};

/// Draws a bullet along its [`Shot`] trajectory.
///
/// Elapsed wall-clock time is multiplied by `time_scale` before the
/// trajectory is evaluated, so a scale below 1 plays the flight in slow
/// motion.
pub struct ShotAnimation {
    shot: Arc<Shot>,
    bullet: Arc<Pixmap>,
    clock: AnimationClock,
    time_scale: f64,
    visibility: Visibility,
}

impl ShotAnimation {
    pub fn new(shot: Arc<Shot>, bullet: Arc<Pixmap>, time_scale: f64, duration: Duration) -> Self {
        Self {
            shot,
            bullet,
            clock: AnimationClock::new(duration),
            time_scale,
            visibility: Visibility::visible(),
        }
    }

    /// Like [`ShotAnimation::new`] but decodes the bullet image from disk.
    pub fn load(
        shot: Arc<Shot>,
        bullet_path: impl AsRef<Path>,
        time_scale: f64,
        duration: Duration,
    ) -> Result<Self, AssetError> {
        let bullet = Arc::new(Pixmap::load(bullet_path)?);
        Ok(Self::new(shot, bullet, time_scale, duration))
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Game time corresponding to a wall-clock `elapsed`.
    pub fn game_time(&self, elapsed: Duration) -> f64 {
        elapsed.as_secs_f64() * self.time_scale
    }

    /// Bullet position `elapsed` after the animation started.
    pub fn position_at(&self, elapsed: Duration) -> (i32, i32) {
        let (x, y) = self.shot.position_at(self.game_time(elapsed));
        (x.round() as i32, y.round() as i32)
    }

    /// Draw the bullet as it stands `elapsed` into the flight. The image's
    /// top-left corner sits on the trajectory point.
    pub fn paint_elapsed(&self, surface: &mut dyn Surface, elapsed: Duration) {
        let (x, y) = self.position_at(elapsed);
        surface.draw_pixmap(&self.bullet, x, y);
    }
}

/// Wall-clock time a shot needs to reach `floor_y` on its way down, given
/// the time scale used to play it back. Capped at `max`.
pub fn flight_duration(shot: &Shot, floor_y: f64, time_scale: f64, max: Duration) -> Duration {
    if time_scale <= 0.0 {
        return max;
    }
    shot.time_to_reach_y(floor_y)
        .and_then(|t| Duration::try_from_secs_f64(t / time_scale).ok())
        .map_or(max, |d| d.min(max))
}

impl Drawable for ShotAnimation {
    fn paint(&self, surface: &mut dyn Surface) {
        if !self.is_enabled() {
            return;
        }
        self.paint_elapsed(surface, self.clock.elapsed());
    }

    fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    fn shot(&self) -> Option<&Arc<Shot>> {
        Some(&self.shot)
    }
}

impl Animation for ShotAnimation {
    fn clock(&self) -> &AnimationClock {
        &self.clock
    }
}
