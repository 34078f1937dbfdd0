//! Decoded images and the drawing surface every drawable paints on.
//!
//! Images are decoded once on the CPU with `image` into [`Pixmap`]s so
//! they can be shared between the logic thread and the render thread without
//! touching the GPU. The window layer uploads finished frames only.

use std::path::{Path, PathBuf};

use log::debug;
use raylib::prelude::Color;
use thiserror::Error;

/// Failure to turn an image file into a [`Pixmap`].
#[derive(Debug, Error)]
pub enum AssetError {
    /// The file could not be read (missing, permissions, ...).
    #[error("cannot read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file was read but is not a decodable image.
    #[error("cannot decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Anything a drawable can paint on.
///
/// Coordinates are in pixels with the origin at the top-left corner. Draw
/// calls that fall partially or completely outside the surface are clipped.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Fill an axis-aligned rectangle with a color.
    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color);
    /// Draw an image with its top-left corner at `(x, y)`, unscaled.
    fn draw_pixmap(&mut self, pixmap: &Pixmap, x: i32, y: i32);
}

/// An in-memory RGBA image backed by a [`tiny_skia::Pixmap`].
///
/// Pixels are stored premultiplied; [`Pixmap::pixel`] and
/// [`Pixmap::set_pixel`] speak straight (non-premultiplied) [`Color`].
/// A zero-sized pixmap has no backing storage and draws nothing.
#[derive(Clone, Debug)]
pub struct Pixmap {
    width: u32,
    height: u32,
    inner: Option<tiny_skia::Pixmap>,
}

impl Pixmap {
    /// Decode an image file. No placeholder is produced on failure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let pixmap = Self::from_rgba(rgba.width(), rgba.height(), rgba.as_raw());
        debug!(
            "Decoded {} ({}x{})",
            path.display(),
            pixmap.width,
            pixmap.height
        );
        Ok(pixmap)
    }

    /// Build a pixmap from tightly packed, straight-alpha RGBA bytes.
    ///
    /// Missing trailing bytes are treated as transparent pixels.
    pub fn from_rgba(width: u32, height: u32, bytes: &[u8]) -> Self {
        let mut inner = tiny_skia::Pixmap::new(width, height);
        if let Some(pixmap) = inner.as_mut() {
            for (dst, src) in pixmap.pixels_mut().iter_mut().zip(bytes.chunks_exact(4)) {
                *dst = premultiply(Color::new(src[0], src[1], src[2], src[3]));
            }
        }
        Self {
            width,
            height,
            inner,
        }
    }

    /// A pixmap where every pixel has the same color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let mut inner = tiny_skia::Pixmap::new(width, height);
        if let Some(pixmap) = inner.as_mut() {
            pixmap.pixels_mut().fill(premultiply(color));
        }
        Self {
            width,
            height,
            inner,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.inner.as_ref()?.pixel(x, y).map(demultiply)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y as usize * self.width as usize + x as usize;
        if let Some(pixel) = self
            .inner
            .as_mut()
            .and_then(|pixmap| pixmap.pixels_mut().get_mut(index))
        {
            *pixel = premultiply(color);
        }
    }

    /// Borrow the backing pixmap for drawing. `None` when zero-sized.
    pub fn as_skia(&self) -> Option<tiny_skia::PixmapRef<'_>> {
        self.inner.as_ref().map(|pixmap| pixmap.as_ref())
    }
}

pub(crate) fn premultiply(c: Color) -> tiny_skia::PremultipliedColorU8 {
    tiny_skia::ColorU8::from_rgba(c.r, c.g, c.b, c.a).premultiply()
}

pub(crate) fn demultiply(p: tiny_skia::PremultipliedColorU8) -> Color {
    let c = p.demultiply();
    Color::new(c.red(), c.green(), c.blue(), c.alpha())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(c: Color) -> (u8, u8, u8, u8) {
        (c.r, c.g, c.b, c.a)
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Pixmap::load(dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, AssetError::Read { .. }));
        assert!(err.to_string().contains("nope.png"));
    }

    #[test]
    fn test_load_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = Pixmap::load(&path).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn test_load_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        let mut img = image::RgbaImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();

        let pixmap = Pixmap::load(&path).unwrap();
        assert_eq!(pixmap.width(), 3);
        assert_eq!(pixmap.height(), 2);
        assert_eq!(rgba(pixmap.pixel(2, 1).unwrap()), (10, 20, 30, 255));
        assert_eq!(rgba(pixmap.pixel(0, 0).unwrap()), (0, 0, 0, 0));
    }

    #[test]
    fn test_from_rgba_pads_short_input() {
        let pixmap = Pixmap::from_rgba(2, 2, &[1, 2, 3, 255]);
        assert_eq!(rgba(pixmap.pixel(0, 0).unwrap()), (1, 2, 3, 255));
        assert_eq!(rgba(pixmap.pixel(1, 1).unwrap()).3, 0);
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let mut pixmap = Pixmap::filled(2, 2, Color::WHITE);
        assert!(pixmap.pixel(2, 0).is_none());
        pixmap.set_pixel(5, 5, Color::BLACK);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(pixmap.pixel(x, y).unwrap().r, 255);
        }
    }

    #[test]
    fn test_zero_sized_pixmap_has_no_pixels() {
        let pixmap = Pixmap::filled(0, 3, Color::WHITE);
        assert_eq!((pixmap.width(), pixmap.height()), (0, 3));
        assert!(pixmap.pixel(0, 0).is_none());
        assert!(pixmap.as_skia().is_none());
    }
}
