//! Drawables: everything the canvas can paint.
//!
//! Submodules overview:
//! - [`aimarrow`] – aim indicator painted on top of the focused tank
//! - [`animation`] – start instant and fixed lifetime shared by animations
//! - [`dirtmap`] – seeded terrain heightmap used as background
//! - [`drawable`] – the `Drawable` capability and its visibility flag
//! - [`shotanimation`] – a bullet flying along its trajectory
//! - [`sprite`] – static image anchored at its bottom center
//! - [`tanksprite`] – tank image and health bar following a tank

pub mod aimarrow;
pub mod animation;
pub mod dirtmap;
pub mod drawable;
pub mod shotanimation;
pub mod sprite;
pub mod tanksprite;
