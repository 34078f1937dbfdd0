//! Player tank state.

use std::f64::consts::PI;
use std::sync::{PoisonError, RwLock};

use crate::model::shot::Shot;

pub const MAX_HEALTH: u32 = 100;
pub const MIN_POWER: f64 = 0.5;
pub const MAX_POWER: f64 = 6.0;
/// Default aim, matching the classic opening shot.
pub const DEFAULT_ANGLE: f64 = 0.9;
pub const DEFAULT_POWER: f64 = 3.0;
/// Height of the barrel above the tank's ground point.
pub const BARREL_HEIGHT: f64 = 10.0;

/// Snapshot of a tank's mutable state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankState {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub power: f64,
    pub health: u32,
}

/// A tank. Shared between the logic thread (writer) and the render thread
/// (reader) behind an `Arc`; the view matches tanks by pointer identity.
#[derive(Debug)]
pub struct Tank {
    id: u32,
    name: String,
    state: RwLock<TankState>,
}

impl Tank {
    pub fn new(id: u32, name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id,
            name: name.into(),
            state: RwLock::new(TankState {
                x,
                y,
                angle: DEFAULT_ANGLE,
                power: DEFAULT_POWER,
                health: MAX_HEALTH,
            }),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TankState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<R>(&self, f: impl FnOnce(&mut TankState) -> R) -> R {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }

    pub fn place(&self, x: f64, y: f64) {
        self.update(|s| {
            s.x = x;
            s.y = y;
        });
    }

    /// Rotate the aim, clamped between pointing right (0) and left (PI).
    pub fn aim_by(&self, delta: f64) {
        self.update(|s| s.angle = (s.angle + delta).clamp(0.0, PI));
    }

    pub fn power_by(&self, delta: f64) {
        self.update(|s| s.power = (s.power + delta).clamp(MIN_POWER, MAX_POWER));
    }

    /// Apply damage and return the remaining health.
    pub fn damage(&self, amount: u32) -> u32 {
        self.update(|s| {
            s.health = s.health.saturating_sub(amount);
            s.health
        })
    }

    pub fn is_alive(&self) -> bool {
        self.state().health > 0
    }

    /// Where shots leave the barrel.
    pub fn muzzle(&self) -> (f64, f64) {
        let s = self.state();
        (s.x, s.y - BARREL_HEIGHT)
    }

    /// Launch a shot with the given aim, independent of the stored aim.
    pub fn fire_with(&self, angle: f64, power: f64, gravity: f64) -> Shot {
        Shot::new(self.id, self.muzzle(), angle, power, gravity)
    }

    /// Launch a shot using the tank's current aim.
    pub fn fire(&self, gravity: f64) -> Shot {
        let s = self.state();
        self.fire_with(s.angle, s.power, gravity)
    }
}
