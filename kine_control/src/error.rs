//! Error taxonomy of the observer and impedance controller.
//!
//! - Construction-time: `InvalidSelector`, `InvalidParameter`, `InvalidImpedance`
//! - Per-call: `UnknownFrame`, `DimensionMismatch`
//! - Numeric degeneracy: `IllConditionedMap`, `SingularTaskInertia`
//! - Caller ordering: `ImpedanceNotSet`
//!
//! Nothing is retried internally. A singular solve with unchanged inputs
//! cannot succeed on a second attempt, so recovery is left to the caller.

use kine_common::model::ModelError;
use thiserror::Error;

/// Why a selector was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectorFault {
    /// Index outside `[0, 5]`.
    #[error("index {0} out of range [0, 5]")]
    OutOfRange(usize),
    /// Index listed more than once.
    #[error("index {0} listed twice")]
    Duplicate(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KineError {
    #[error("invalid selector: {0}")]
    InvalidSelector(#[from] SelectorFault),

    #[error("unknown frame '{0}'")]
    UnknownFrame(String),

    /// Wrench mapping too close to singular (reciprocal condition number).
    #[error("ill-conditioned wrench map (rcond = {rcond:e})")]
    IllConditionedMap { rcond: f64 },

    /// `J·B⁻¹·Jᵗ` is rank-deficient, e.g. at a kinematic singularity.
    #[error("singular task-space inertia (rcond = {rcond:e})")]
    SingularTaskInertia { rcond: f64 },

    #[error("cartesian impedance not set")]
    ImpedanceNotSet,

    #[error("invalid impedance: {0}")]
    InvalidImpedance(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{what}: expected dimension {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl From<ModelError> for KineError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::UnknownFrame(name) => Self::UnknownFrame(name),
            ModelError::DimensionMismatch {
                what,
                expected,
                actual,
            } => Self::DimensionMismatch {
                what,
                expected,
                actual,
            },
            ModelError::FrameNameTooLong(name) => {
                Self::InvalidParameter(format!("frame name '{name}' too long"))
            }
            ModelError::FrameCapacityExceeded => {
                Self::InvalidParameter("model frame table full".to_string())
            }
        }
    }
}
