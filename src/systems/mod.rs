//! Application systems
//!
//! Frame orchestration kept out of main.rs so it can be tested headless.

mod simulation;

pub use simulation::SimulationSystem;
