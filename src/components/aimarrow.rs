//! Aim indicator for the focused tank.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use raylib::prelude::Color;

use crate::components::drawable::{Drawable, Visibility};
use crate::components::sprite::Sprite;
use crate::model::tank::{BARREL_HEIGHT, Tank};
use crate::resources::pixmap::{AssetError, Pixmap, Surface};

pub const AIM_DOTS: usize = 6;
/// Distance between aim dots per unit of shot power.
pub const DOT_SPACING_PER_POWER: f64 = 4.0;
pub const DOT_SIZE: u32 = 3;
const DOT_COLOR: Color = Color::new(255, 255, 255, 200);
const DEFAULT_LIFT: u32 = 24;

/// Arrow image hovering over the focused tank plus a dotted line along its
/// aim. Starts disabled and unbound; paints nothing until both change.
pub struct AimArrow {
    arrow: Sprite,
    tank: RwLock<Option<Arc<Tank>>>,
    lift: RwLock<u32>,
    visibility: Visibility,
}

impl AimArrow {
    pub fn new(image: Arc<Pixmap>) -> Self {
        Self {
            arrow: Sprite::new(image),
            tank: RwLock::new(None),
            lift: RwLock::new(DEFAULT_LIFT),
            visibility: Visibility::hidden(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        Ok(Self::new(Arc::new(Pixmap::load(path)?)))
    }

    pub fn set_tank(&self, tank: Option<Arc<Tank>>) {
        *self.tank.write().unwrap_or_else(PoisonError::into_inner) = tank;
    }

    pub fn focused_tank(&self) -> Option<Arc<Tank>> {
        self.tank
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How far above the tank's ground point the arrow is anchored.
    pub fn set_lift(&self, lift: u32) {
        *self.lift.write().unwrap_or_else(PoisonError::into_inner) = lift;
    }

    pub fn lift(&self) -> u32 {
        *self.lift.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drawable for AimArrow {
    fn paint(&self, surface: &mut dyn Surface) {
        if !self.is_enabled() {
            return;
        }
        let Some(tank) = self.focused_tank() else {
            return;
        };
        let s = tank.state();
        let x = s.x.round() as i32;
        self.arrow
            .paint_at(surface, x, s.y.round() as i32 - self.lift() as i32);

        let spacing = DOT_SPACING_PER_POWER * s.power;
        let (muzzle_x, muzzle_y) = (s.x, s.y - BARREL_HEIGHT);
        for i in 1..=AIM_DOTS {
            let distance = spacing * i as f64;
            let dx = muzzle_x + s.angle.cos() * distance;
            let dy = muzzle_y - s.angle.sin() * distance;
            let half = (DOT_SIZE / 2) as i32;
            surface.fill_rect(
                dx.round() as i32 - half,
                dy.round() as i32 - half,
                DOT_SIZE,
                DOT_SIZE,
                DOT_COLOR,
            );
        }
    }

    fn visibility(&self) -> &Visibility {
        &self.visibility
    }
}
