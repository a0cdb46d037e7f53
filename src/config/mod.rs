//! Simulation configuration, control panel state, and color parsing.

mod color;
pub mod controls;
pub mod sim;
