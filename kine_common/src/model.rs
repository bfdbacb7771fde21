//! Rigid-body model adapter.
//!
//! The force observer and the impedance controller never compute dynamics
//! themselves. They read a per-cycle snapshot of joint state, dynamics terms
//! and frame kinematics through [`RigidBodyModel`]. The control loop owns one
//! adapter instance, refreshes it once per cycle, and passes it by reference
//! to every dependent `update`.
//!
//! Spatial vectors follow the `[linear; angular]` ordering:
//! ```text
//! wrench = [fx fy fz tx ty tz]
//! twist  = [vx vy vz wx wy wz]
//! ```

use nalgebra::{DMatrix, DVector, Isometry3, Matrix6xX, Vector3, Vector6};
use thiserror::Error;

/// 6-D contact wrench `[force; torque]`.
pub type Wrench = Vector6<f64>;

/// Linear force [N].
pub type Force3D = Vector3<f64>;

/// Angular torque [N·m].
pub type Torque3D = Vector3<f64>;

/// Frame Jacobian (6 × nv), rows ordered `[linear; angular]`.
pub type FrameJacobian = Matrix6xX<f64>;

/// Errors reported by a model adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The requested frame is not known to the model.
    #[error("unknown frame '{0}'")]
    UnknownFrame(String),

    /// A supplied vector or matrix does not match the model dimension.
    #[error("{what}: expected dimension {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A frame name exceeds the fixed name capacity.
    #[error("frame name '{0}' exceeds capacity")]
    FrameNameTooLong(String),

    /// The frame table is full.
    #[error("frame table full")]
    FrameCapacityExceeded,
}

/// Read-only view of a rigid-body model evaluated at the current state.
///
/// All quantities are expressed in SI units (rad, rad/s, rad/s², N·m) and
/// are assumed consistent with each other for the duration of one control
/// cycle.
pub trait RigidBodyModel {
    /// Number of velocity degrees of freedom (n).
    fn nv(&self) -> usize;

    /// Joint positions q.
    fn q(&self) -> &DVector<f64>;

    /// Joint velocities v.
    fn v(&self) -> &DVector<f64>;

    /// Joint accelerations a.
    fn a(&self) -> &DVector<f64>;

    /// Measured joint efforts τ.
    fn tau(&self) -> &DVector<f64>;

    /// Joint-space inertia matrix B(q), n × n, symmetric positive-definite.
    fn mass_matrix(&self) -> &DMatrix<f64>;

    /// Coriolis/centrifugal matrix C(q, v), n × n.
    fn coriolis(&self) -> &DMatrix<f64>;

    /// Gravity vector g(q).
    fn gravity(&self) -> &DVector<f64>;

    /// Jacobian (6 × n) of the named frame.
    fn jacobian(&self, frame: &str) -> Result<&FrameJacobian, ModelError>;

    /// Pose of the named frame in the world frame.
    fn frame_pose(&self, frame: &str) -> Result<Isometry3<f64>, ModelError>;

    /// Name of the designated end-effector frame.
    fn end_effector_frame(&self) -> &str;
}

/// Split a wrench into its linear force and angular torque parts.
#[inline]
pub fn split_wrench(wrench: &Wrench) -> (Force3D, Torque3D) {
    (
        wrench.fixed_rows::<3>(0).into_owned(),
        wrench.fixed_rows::<3>(3).into_owned(),
    )
}
