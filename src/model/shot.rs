//! Projectile trajectory math.

/// Launch speed in pixels per second for each unit of power.
pub const SPEED_PER_POWER: f64 = 120.0;

/// A fired projectile. Immutable once launched.
///
/// Angles are in radians, counter-clockwise from the positive x axis, so
/// `PI / 2` fires straight up. Screen y grows downward, gravity pulls toward
/// larger y.
#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    owner: u32,
    origin: (f64, f64),
    angle: f64,
    power: f64,
    gravity: f64,
}

impl Shot {
    pub fn new(owner: u32, origin: (f64, f64), angle: f64, power: f64, gravity: f64) -> Self {
        Self {
            owner,
            origin,
            angle,
            power,
            gravity,
        }
    }

    /// Id of the tank that fired this shot.
    pub fn owner(&self) -> u32 {
        self.owner
    }

    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Initial velocity in screen space (negative y is up).
    pub fn velocity(&self) -> (f64, f64) {
        let speed = self.power * SPEED_PER_POWER;
        (speed * self.angle.cos(), -speed * self.angle.sin())
    }

    /// Position `t` seconds of game time after launch.
    pub fn position_at(&self, t: f64) -> (f64, f64) {
        let (vx, vy) = self.velocity();
        (
            self.origin.0 + vx * t,
            self.origin.1 + vy * t + 0.5 * self.gravity * t * t,
        )
    }

    pub fn bullet_x(&self, t: f64) -> f64 {
        self.position_at(t).0
    }

    pub fn bullet_y(&self, t: f64) -> f64 {
        self.position_at(t).1
    }

    /// Game time at which the shot is last at height `y` while moving down.
    ///
    /// `None` if the shot never reaches `y` after launch.
    pub fn time_to_reach_y(&self, y: f64) -> Option<f64> {
        let (_, vy) = self.velocity();
        let dy = y - self.origin.1;
        let t = if self.gravity.abs() < f64::EPSILON {
            if vy.abs() < f64::EPSILON {
                return None;
            }
            dy / vy
        } else {
            // 0.5 g t^2 + vy t - dy = 0
            let disc = vy * vy + 2.0 * self.gravity * dy;
            if disc < 0.0 {
                return None;
            }
            let root = disc.sqrt();
            let a = (-vy + root) / self.gravity;
            let b = (-vy - root) / self.gravity;
            a.max(b)
        };
        (t.is_finite() && t > 0.0).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_flat_shot_without_gravity_is_linear() {
        let shot = Shot::new(0, (10.0, 100.0), 0.0, 1.0, 0.0);
        let (x, y) = shot.position_at(2.0);
        assert!(approx_eq(x, 10.0 + 2.0 * SPEED_PER_POWER));
        assert!(approx_eq(y, 100.0));
    }

    #[test]
    fn test_vertical_shot_returns_to_origin() {
        let shot = Shot::new(0, (0.0, 500.0), FRAC_PI_2, 2.0, 240.0);
        // Up at 240 px/s, gravity 240 px/s^2: back at y=500 after 2 seconds.
        let t = shot.time_to_reach_y(500.0).unwrap();
        assert!(approx_eq(t, 2.0));
        assert!(approx_eq(shot.bullet_y(1.0), 500.0 - 240.0 + 120.0));
    }

    #[test]
    fn test_unreachable_height() {
        let shot = Shot::new(0, (0.0, 500.0), FRAC_PI_2, 1.0, 240.0);
        // Apex is 500 - 120^2 / (2 * 240) = 470.
        assert!(shot.time_to_reach_y(400.0).is_none());
        assert!(shot.time_to_reach_y(480.0).is_some());
    }

    #[test]
    fn test_no_gravity_moving_away() {
        let shot = Shot::new(0, (0.0, 500.0), FRAC_PI_2, 1.0, 0.0);
        assert!(shot.time_to_reach_y(600.0).is_none());
        assert!(approx_eq(shot.time_to_reach_y(380.0).unwrap(), 1.0));
    }
}
