//! Shared resources used by the canvas and the game.
//!
//! Submodules overview:
//! - [`drawablelist`] – copy-on-write list of drawables, safe to iterate while it changes
//! - [`framebuffer`] – off-screen frame buffer and hand-off of finished frames
//! - [`gameconfig`] – INI-backed game configuration
//! - [`imagestore`] – path-keyed cache of decoded images
//! - [`pixmap`] – decoded images, asset errors and the `Surface` trait

pub mod drawablelist;
pub mod framebuffer;
pub mod gameconfig;
pub mod imagestore;
pub mod pixmap;
