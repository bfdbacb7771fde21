//! Cartesian reference and task-space error.
//!
//! Errors are `measured − reference`. The pose error stacks the position
//! difference over the rotation vector of `R_meas·R_refᵗ`, expressed in the
//! world frame and taken along the shortest geodesic (angle ≤ π).

use nalgebra::{Isometry3, Rotation3, Translation3, UnitQuaternion, Vector3, Vector6};

/// Reference pose with its twist and acceleration feed-forward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskReference {
    pub pose: Isometry3<f64>,
    /// `[v; ω]` in the world frame.
    pub twist: Vector6<f64>,
    pub accel: Vector6<f64>,
}

impl Default for TaskReference {
    fn default() -> Self {
        Self::hold(Isometry3::identity())
    }
}

impl TaskReference {
    /// Stationary reference at `pose`.
    pub fn hold(pose: Isometry3<f64>) -> Self {
        Self {
            pose,
            twist: Vector6::zeros(),
            accel: Vector6::zeros(),
        }
    }

    pub fn from_parts(
        position: Vector3<f64>,
        rotation: &Rotation3<f64>,
        twist: Vector6<f64>,
        accel: Vector6<f64>,
    ) -> Self {
        Self {
            pose: Isometry3::from_parts(
                Translation3::from(position),
                UnitQuaternion::from_rotation_matrix(rotation),
            ),
            twist,
            accel,
        }
    }
}

/// Cartesian task: a reference and the errors of measurements against it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartesianTask {
    reference: TaskReference,
}

impl CartesianTask {
    pub fn new(reference: TaskReference) -> Self {
        Self { reference }
    }

    /// Replace the whole reference.
    #[inline]
    pub fn update(&mut self, reference: TaskReference) {
        self.reference = reference;
    }

    pub fn update_parts(
        &mut self,
        position: Vector3<f64>,
        rotation: &Rotation3<f64>,
        twist: Vector6<f64>,
        accel: Vector6<f64>,
    ) {
        self.reference = TaskReference::from_parts(position, rotation, twist, accel);
    }

    #[inline]
    pub fn reference(&self) -> &TaskReference {
        &self.reference
    }

    /// Pose error `[p_meas − p_ref; log(R_meas·R_refᵗ)]`.
    pub fn compute_task_err(&self, measured: &Isometry3<f64>) -> Vector6<f64> {
        let dp = measured.translation.vector - self.reference.pose.translation.vector;
        let dr = rotation_error(&measured.rotation, &self.reference.pose.rotation);
        Vector6::new(dp.x, dp.y, dp.z, dr.x, dr.y, dr.z)
    }

    pub fn compute_task_err_parts(
        &self,
        position: &Vector3<f64>,
        rotation: &Rotation3<f64>,
    ) -> Vector6<f64> {
        let measured = Isometry3::from_parts(
            Translation3::from(*position),
            UnitQuaternion::from_rotation_matrix(rotation),
        );
        self.compute_task_err(&measured)
    }

    /// Twist error `twist − twist_ref`.
    #[inline]
    pub fn compute_task_dot_err(&self, twist: &Vector6<f64>) -> Vector6<f64> {
        twist - self.reference.twist
    }

    /// Acceleration error `accel − accel_ref`.
    #[inline]
    pub fn compute_task_ddot_err(&self, accel: &Vector6<f64>) -> Vector6<f64> {
        accel - self.reference.accel
    }
}

/// Rotation vector of `q_meas · q_ref⁻¹`.
///
/// The vector part of the product is expanded by hand so that equal inputs
/// cancel exactly and swapped inputs give exactly opposite results.
fn rotation_error(q_meas: &UnitQuaternion<f64>, q_ref: &UnitQuaternion<f64>) -> Vector3<f64> {
    let (wm, vm) = (q_meas.w, q_meas.imag());
    let (wr, vr) = (q_ref.w, q_ref.imag());

    let mut w = wm * wr + vm.dot(&vr);
    let mut v = (vm * wr - vr * wm) - vm.cross(&vr);
    // q and −q are the same rotation; keep the short way round.
    if w < 0.0 {
        w = -w;
        v = -v;
    }

    let s = v.norm();
    if s == 0.0 {
        return Vector3::zeros();
    }
    let scale = if s < 1e-12 {
        2.0 / w
    } else {
        2.0 * s.atan2(w) / s
    };
    v * scale
}

// ─── Tests ──────────────────────────────────────────────────────────
