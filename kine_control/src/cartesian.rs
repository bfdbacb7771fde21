//! Cartesian task and impedance primitives.

pub mod impedance;
pub mod task;
