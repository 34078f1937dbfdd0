//! Visuals that follow a tank: the tank itself and its health bar.
//!
//! Both report their tank through [`Drawable::tank`], which is how the
//! canvas finds everything to remove once the tank is destroyed.

use std::sync::Arc;

use raylib::prelude::Color;

use crate::components::drawable::{Drawable, Visibility};
use crate::components::sprite::Sprite;
use crate::model::tank::{MAX_HEALTH, Tank};
use crate::resources::pixmap::{Pixmap, Surface};

pub const HEALTH_BAR_WIDTH: u32 = 32;
pub const HEALTH_BAR_HEIGHT: u32 = 4;
const HEALTH_BAR_BACK: Color = Color::new(90, 0, 0, 255);
const HEALTH_BAR_FILL: Color = Color::new(40, 220, 60, 255);

/// Tank image standing on the tank's current position.
pub struct TankSprite {
    tank: Arc<Tank>,
    sprite: Sprite,
    visibility: Visibility,
}

impl TankSprite {
    pub fn new(tank: Arc<Tank>, image: Arc<Pixmap>) -> Self {
        Self {
            tank,
            sprite: Sprite::new(image),
            visibility: Visibility::visible(),
        }
    }

    pub fn height(&self) -> u32 {
        self.sprite.height()
    }
}

impl Drawable for TankSprite {
    fn paint(&self, surface: &mut dyn Surface) {
        if !self.is_enabled() {
            return;
        }
        let s = self.tank.state();
        self.sprite
            .paint_at(surface, s.x.round() as i32, s.y.round() as i32);
    }

    fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    fn tank(&self) -> Option<&Arc<Tank>> {
        Some(&self.tank)
    }
}

/// Remaining health drawn as a bar floating `lift` pixels above the tank.
pub struct HealthBar {
    tank: Arc<Tank>,
    lift: u32,
    visibility: Visibility,
}

impl HealthBar {
    pub fn new(tank: Arc<Tank>, lift: u32) -> Self {
        Self {
            tank,
            lift,
            visibility: Visibility::visible(),
        }
    }

    /// Width of the filled part for a given health value.
    pub fn fill_width(health: u32) -> u32 {
        HEALTH_BAR_WIDTH * health.min(MAX_HEALTH) / MAX_HEALTH
    }
}

impl Drawable for HealthBar {
    fn paint(&self, surface: &mut dyn Surface) {
        if !self.is_enabled() {
            return;
        }
        let s = self.tank.state();
        let left = s.x.round() as i32 - (HEALTH_BAR_WIDTH / 2) as i32;
        let top = s.y.round() as i32 - self.lift as i32 - HEALTH_BAR_HEIGHT as i32;
        surface.fill_rect(left, top, HEALTH_BAR_WIDTH, HEALTH_BAR_HEIGHT, HEALTH_BAR_BACK);
        let filled = Self::fill_width(s.health);
        if filled > 0 {
            surface.fill_rect(left, top, filled, HEALTH_BAR_HEIGHT, HEALTH_BAR_FILL);
        }
    }

    fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    fn tank(&self) -> Option<&Arc<Tank>> {
        Some(&self.tank)
    }
}
