//! Particle model, storage, and the per-tick smoke machine.

pub mod machine;
pub mod particle;
pub mod store;
