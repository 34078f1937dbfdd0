//! Systems that run the game.
//!
//! Submodules overview:
//! - [`canvas`] – scene ownership, compositing and the render task
//! - [`delayer`] – one-shot delayed jobs (animation disposal)
//! - [`gametimer`] – fixed-rate scheduler driving the render task
//! - [`input`] – keyboard polling into game events

pub mod canvas;
pub mod delayer;
pub mod gametimer;
pub mod input;
