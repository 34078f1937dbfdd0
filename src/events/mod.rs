//! Event types.
//!
//! - [`gameevent`] – player actions routed from input to the game logic

pub mod gameevent;
