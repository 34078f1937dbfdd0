//! Logical game entities.
//!
//! The view layer holds these by `Arc` and matches them by pointer identity;
//! it never mutates them.
//!
//! - [`tank`] – a player tank with position, aim and health
//! - [`shot`] – a fired projectile and its trajectory

pub mod shot;
pub mod tank;
