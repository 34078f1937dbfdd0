//! Destructible-looking terrain used as the canvas background.
//!
//! The map is a column heightmap generated from a seed. [`DirtMap::pretty_paint`]
//! renders it once into a cached [`Pixmap`]; after that every frame is a
//! single blit.

use std::sync::{Arc, OnceLock};

use fastrand::Rng;
use log::debug;
use raylib::prelude::Color;

use crate::components::drawable::{Drawable, Visibility};
use crate::resources::pixmap::{Pixmap, Surface};

const GRASS: Color = Color::new(60, 160, 40, 255);
const DIRT_TOP: Color = Color::new(150, 100, 50, 255);
const DIRT_BOTTOM: Color = Color::new(80, 50, 25, 255);
const GRASS_DEPTH: i32 = 4;
/// Largest height change between neighbouring columns.
const MAX_STEP: f64 = 1.5;

pub struct DirtMap {
    width: u32,
    height: u32,
    /// Screen y of the ground surface for every column.
    ground: Vec<i32>,
    rendered: OnceLock<Arc<Pixmap>>,
    visibility: Visibility,
}

impl DirtMap {
    /// Build a map from explicit ground heights, one per column.
    pub fn from_heights(width: u32, height: u32, ground: Vec<i32>) -> Self {
        let mut ground = ground;
        ground.resize(width as usize, height as i32);
        Self {
            width,
            height,
            ground,
            rendered: OnceLock::new(),
            visibility: Visibility::visible(),
        }
    }

    /// Rolling hills between one third and seven eighths of the height.
    pub fn generate(width: u32, height: u32, seed: u64) -> Self {
        let mut rng = Rng::with_seed(seed);
        let top = f64::from(height) / 3.0;
        let bottom = f64::from(height) * 7.0 / 8.0;
        let mut level = f64::from(height) * 2.0 / 3.0;
        let mut slope = 0.0_f64;
        let ground = (0..width)
            .map(|_| {
                slope = (slope + (rng.f64() - 0.5) * 0.4).clamp(-MAX_STEP, MAX_STEP);
                level += slope;
                if level < top || level > bottom {
                    level = level.clamp(top, bottom);
                    slope = -slope * 0.5;
                }
                level.round() as i32
            })
            .collect();
        debug!("Generated {}x{} map from seed {}", width, height, seed);
        Self::from_heights(width, height, ground)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Screen y of the ground at column `x`, clamped to the map edges.
    pub fn ground_at(&self, x: i32) -> i32 {
        let last = self.ground.len().saturating_sub(1);
        let column = (x.max(0) as usize).min(last);
        self.ground
            .get(column)
            .copied()
            .unwrap_or(self.height as i32)
    }

    /// True when the point is inside the map and below the ground line.
    pub fn is_solid(&self, x: f64, y: f64) -> bool {
        if x < 0.0 || x >= f64::from(self.width) {
            return false;
        }
        y >= f64::from(self.ground_at(x as i32))
    }

    pub fn is_pre_rendered(&self) -> bool {
        self.rendered.get().is_some()
    }

    /// Render the terrain into the cached image. Only the first call works.
    pub fn pretty_paint(&self) {
        self.rendered.get_or_init(|| {
            let mut pixmap = Pixmap::filled(self.width, self.height, Color::BLANK);
            for (x, &surface_y) in self.ground.iter().enumerate() {
                for y in surface_y.max(0)..self.height as i32 {
                    pixmap.set_pixel(x as u32, y as u32, self.soil_color(surface_y, y));
                }
            }
            debug!("Pre-rendered {}x{} map", self.width, self.height);
            Arc::new(pixmap)
        });
    }

    fn soil_color(&self, surface_y: i32, y: i32) -> Color {
        if y - surface_y < GRASS_DEPTH {
            return GRASS;
        }
        let span = (self.height as i32 - surface_y).max(1) as f32;
        let t = (y - surface_y) as f32 / span;
        let lerp = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t) as u8;
        Color::new(
            lerp(DIRT_TOP.r, DIRT_BOTTOM.r),
            lerp(DIRT_TOP.g, DIRT_BOTTOM.g),
            lerp(DIRT_TOP.b, DIRT_BOTTOM.b),
            255,
        )
    }
}

impl Drawable for DirtMap {
    fn paint(&self, surface: &mut dyn Surface) {
        if !self.is_enabled() {
            return;
        }
        match self.rendered.get() {
            Some(pixmap) => surface.draw_pixmap(pixmap, 0, 0),
            None => {
                // Not pre-rendered yet: flat colored columns.
                for (x, &surface_y) in self.ground.iter().enumerate() {
                    let depth = (self.height as i32 - surface_y).max(0) as u32;
                    surface.fill_rect(x as i32, surface_y, 1, depth, DIRT_TOP);
                }
            }
        }
    }

    fn visibility(&self) -> &Visibility {
        &self.visibility
    }
}
