//! The capability shared by everything the canvas can paint.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::model::shot::Shot;
use crate::model::tank::Tank;
use crate::resources::pixmap::Surface;

/// Visibility flag toggled from the logic thread and read while painting.
#[derive(Debug)]
pub struct Visibility(AtomicBool);

impl Visibility {
    pub fn visible() -> Self {
        Self(AtomicBool::new(true))
    }

    pub fn hidden() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Release);
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::visible()
    }
}

/// Something that can be painted on a [`Surface`].
///
/// Drawables are shared between threads behind `Arc`, so every method takes
/// `&self`. Painting must not advance any state: calling [`Drawable::paint`]
/// twice in a row draws the same thing.
pub trait Drawable: Send + Sync {
    /// Paint onto `surface`. A disabled drawable issues no draw calls.
    fn paint(&self, surface: &mut dyn Surface);

    fn visibility(&self) -> &Visibility;

    fn enable(&self) {
        self.visibility().set(true);
    }

    fn disable(&self) {
        self.visibility().set(false);
    }

    fn is_enabled(&self) -> bool {
        self.visibility().get()
    }

    /// Tank this drawable represents, if any.
    fn tank(&self) -> Option<&Arc<Tank>> {
        None
    }

    /// Shot this drawable represents, if any.
    fn shot(&self) -> Option<&Arc<Shot>> {
        None
    }
}
