//! Prelude module for common re-exports.
//!
//! ```rust
//! use kine_common::prelude::*;
//! ```

// ─── Model Adapter ──────────────────────────────────────────────────
pub use crate::model::{
    FrameJacobian, Force3D, ModelError, RigidBodyModel, Torque3D, Wrench, split_wrench,
};
pub use crate::snapshot::DynamicsSnapshot;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{
    BW_ATTENUATION_3DB, DEFAULT_BANDWIDTH_HZ, DEFAULT_LAMBDA, DEFAULT_SAMPLE_PERIOD, WRENCH_DIM,
};
