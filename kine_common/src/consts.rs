//! System-wide constants for the kine workspace.
//!
//! Single source of truth for dimensions, capacities and parameter defaults.

use static_assertions::const_assert;

/// Dimension of a spatial wrench / twist (3 linear + 3 angular).
pub const WRENCH_DIM: usize = 6;

/// Maximum length of a frame name (fixed-capacity storage).
pub const FRAME_NAME_MAX: usize = 64;

/// Maximum number of frames a [`crate::snapshot::DynamicsSnapshot`] can hold.
pub const MAX_FRAMES: usize = 16;

/// Default control sample period [s] (1 kHz).
pub const DEFAULT_SAMPLE_PERIOD: f64 = 0.001;

/// Default observer bandwidth [Hz].
pub const DEFAULT_BANDWIDTH_HZ: f64 = 10.0;

/// Default regularization weight of the wrench mapping.
pub const DEFAULT_LAMBDA: f64 = 1.0;

/// Signal attenuation defining the observer bandwidth (−3 dB).
pub const BW_ATTENUATION_3DB: f64 = 0.707;

const_assert!(WRENCH_DIM == 6);
const_assert!(FRAME_NAME_MAX >= 16);
