//! Off-screen frame buffer and the hand-off of finished frames to the window.
//!
//! The canvas composites each frame into a [`FrameBuffer`] and then hands it
//! to a [`Presenter`] in one call, so the window never sees a half-drawn
//! frame. [`FrameSlot`] is the presenter used by the raylib window: it keeps
//! only the most recent frame, which the window thread uploads to a texture.

use std::sync::{Mutex, PoisonError};

use raylib::prelude::Color;
use tiny_skia::{Paint, PixmapPaint, Rect, Transform};

use crate::resources::pixmap::{Pixmap, Surface, demultiply};

/// Software RGBA frame buffer, rasterized with tiny-skia.
///
/// A zero-sized buffer has no backing storage and ignores draw calls.
pub struct FrameBuffer {
    width: u32,
    height: u32,
    target: Option<tiny_skia::Pixmap>,
}

impl FrameBuffer {
    /// Allocate a transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            target: tiny_skia::Pixmap::new(width, height),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.target.as_ref()?.pixel(x, y).map(demultiply)
    }

    /// Tightly packed straight-alpha RGBA8 bytes, row major, as expected by
    /// texture uploads.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let Some(target) = self.target.as_ref() else {
            return Vec::new();
        };
        let mut bytes = Vec::with_capacity(target.data().len());
        for pixel in target.pixels() {
            let c = pixel.demultiply();
            bytes.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        bytes
    }
}

impl Surface for FrameBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        let Some(target) = self.target.as_mut() else {
            return;
        };
        if w == 0 || h == 0 {
            return;
        }
        let Some(rect) = Rect::from_xywh(x as f32, y as f32, w as f32, h as f32) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = false;
        target
            .as_mut()
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn draw_pixmap(&mut self, pixmap: &Pixmap, x: i32, y: i32) {
        let (Some(target), Some(source)) = (self.target.as_mut(), pixmap.as_skia()) else {
            return;
        };
        target.as_mut().draw_pixmap(
            x,
            y,
            source,
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

/// Receiver of finished frames.
pub trait Presenter: Send + Sync {
    /// Show a completed frame. Called once per composited frame.
    fn present(&self, frame: &FrameBuffer);
}

/// A frame copied out of the canvas, ready for texture upload.
pub struct PresentedFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Single-slot mailbox holding the most recent frame.
///
/// Older frames that were never picked up are overwritten.
#[derive(Default)]
pub struct FrameSlot {
    latest: Mutex<Option<PresentedFrame>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the newest frame, leaving the slot empty.
    pub fn take(&self) -> Option<PresentedFrame> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Presenter for FrameSlot {
    fn present(&self, frame: &FrameBuffer) {
        let presented = PresentedFrame {
            width: frame.width,
            height: frame.height,
            rgba: frame.to_rgba_bytes(),
        };
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(presented);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(c: Color) -> (u8, u8, u8, u8) {
        (c.r, c.g, c.b, c.a)
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.fill_rect(-2, -2, 4, 4, Color::new(200, 0, 0, 255));
        assert_eq!(rgba(fb.pixel(0, 0).unwrap()), (200, 0, 0, 255));
        assert_eq!(rgba(fb.pixel(1, 1).unwrap()), (200, 0, 0, 255));
        assert_eq!(rgba(fb.pixel(2, 2).unwrap()).3, 0);
    }

    #[test]
    fn test_fill_rect_fully_outside_does_nothing() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.fill_rect(10, 10, 4, 4, Color::WHITE);
        fb.fill_rect(0, 0, 0, 4, Color::WHITE);
        assert!(fb.to_rgba_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_draw_pixmap_skips_transparent_pixels() {
        let mut fb = FrameBuffer::new(3, 3);
        fb.fill_rect(0, 0, 3, 3, Color::new(0, 0, 255, 255));
        let mut sprite = Pixmap::filled(2, 2, Color::BLANK);
        sprite.set_pixel(1, 1, Color::new(255, 255, 255, 255));
        fb.draw_pixmap(&sprite, 1, 1);
        assert_eq!(rgba(fb.pixel(1, 1).unwrap()), (0, 0, 255, 255));
        assert_eq!(rgba(fb.pixel(2, 2).unwrap()), (255, 255, 255, 255));
    }

    #[test]
    fn test_draw_pixmap_partially_offscreen() {
        let mut fb = FrameBuffer::new(2, 2);
        let mut sprite = Pixmap::filled(2, 2, Color::BLANK);
        sprite.set_pixel(1, 1, Color::new(9, 9, 9, 255));
        fb.draw_pixmap(&sprite, -1, -1);
        assert_eq!(rgba(fb.pixel(0, 0).unwrap()), (9, 9, 9, 255));
        assert_eq!(rgba(fb.pixel(1, 1).unwrap()).3, 0);
    }

    #[test]
    fn test_half_alpha_fill_blends_over_opaque() {
        let mut fb = FrameBuffer::new(1, 1);
        fb.fill_rect(0, 0, 1, 1, Color::new(0, 0, 0, 255));
        fb.fill_rect(0, 0, 1, 1, Color::new(255, 255, 255, 128));
        let out = fb.pixel(0, 0).unwrap();
        assert!((127..=129).contains(&out.r), "got {}", out.r);
        assert_eq!(out.a, 255);
    }

    #[test]
    fn test_zero_sized_buffer_ignores_draws() {
        let mut fb = FrameBuffer::new(0, 0);
        fb.fill_rect(0, 0, 4, 4, Color::WHITE);
        fb.draw_pixmap(&Pixmap::filled(2, 2, Color::WHITE), 0, 0);
        assert!(fb.pixel(0, 0).is_none());
        assert!(fb.to_rgba_bytes().is_empty());
    }

    #[test]
    fn test_frame_slot_keeps_latest_only() {
        let slot = FrameSlot::new();
        assert!(slot.take().is_none());
        slot.present(&FrameBuffer::new(1, 1));
        slot.present(&FrameBuffer::new(2, 3));
        let frame = slot.take().unwrap();
        assert_eq!((frame.width, frame.height), (2, 3));
        assert_eq!(frame.rgba.len(), 2 * 3 * 4);
        assert!(slot.take().is_none());
    }
}
