use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use crate::components::drawable::{Drawable, Visibility};
use crate::resources::pixmap::{AssetError, Pixmap, Surface};

/// Point where a sprite stands: horizontal center, bottom edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

/// Top-left corner for an image of `width` x `height` anchored at `(x, y)`.
pub fn anchored_origin(width: u32, height: u32, x: i32, y: i32) -> (i32, i32) {
    (x - (width / 2) as i32, y - height as i32)
}

/// A static image drawn standing on its anchor point.
pub struct Sprite {
    image: Arc<Pixmap>,
    anchor: Mutex<Anchor>,
    visibility: Visibility,
}

impl Sprite {
    pub fn new(image: Arc<Pixmap>) -> Self {
        Self {
            image,
            anchor: Mutex::new(Anchor::default()),
            visibility: Visibility::visible(),
        }
    }

    /// Decode `path` and build a visible sprite anchored at the origin.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        Ok(Self::new(Arc::new(Pixmap::load(path)?)))
    }

    pub fn set_position(&self, x: i32, y: i32) {
        *self.anchor.lock().unwrap_or_else(PoisonError::into_inner) = Anchor { x, y };
    }

    pub fn position(&self) -> Anchor {
        *self.anchor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Top-left corner the image is drawn at.
    pub fn draw_origin(&self) -> (i32, i32) {
        let anchor = self.position();
        anchored_origin(self.image.width(), self.image.height(), anchor.x, anchor.y)
    }

    pub fn image(&self) -> &Arc<Pixmap> {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Draw the image anchored at `(x, y)`, ignoring the stored position and
    /// the visibility flag.
    pub fn paint_at(&self, surface: &mut dyn Surface, x: i32, y: i32) {
        let (left, top) = anchored_origin(self.image.width(), self.image.height(), x, y);
        surface.draw_pixmap(&self.image, left, top);
    }
}

impl Drawable for Sprite {
    fn paint(&self, surface: &mut dyn Surface) {
        if !self.is_enabled() {
            return;
        }
        let anchor = self.position();
        self.paint_at(surface, anchor.x, anchor.y);
    }

    fn visibility(&self) -> &Visibility {
        &self.visibility
    }
}
