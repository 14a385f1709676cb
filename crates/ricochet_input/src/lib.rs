//! Player input handling
//!
//! This crate turns raw window events into the controller input used by the
//! physics crate.

mod player_input;

pub use player_input::{yaw_forward, PlayerInput};
