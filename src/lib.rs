//! Tanki library.
//!
//! This module exposes the game's drawables, resources, systems, model and
//! events for use in integration tests and by the `tanki` executable.

pub mod components;
pub mod events;
pub mod game;
pub mod model;
pub mod resources;
pub mod systems;
