//! Ricochet - capsule physics and ricocheting bullets
//!
//! Library half of the application: configuration loading and the
//! per-frame simulation system. The binary drives these headless.

pub mod config;
pub mod systems;
