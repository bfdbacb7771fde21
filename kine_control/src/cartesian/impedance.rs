//! Cartesian impedance controller primitives.
//!
//! Each cycle the controller refreshes, for one control frame,
//!
//! ```text
//! Λ = (J·B⁻¹·Jᵗ)⁻¹          operational-space inertia
//! e = [p − p_ref; log(R·R_refᵗ)]
//! ė = J·q̇ − ẋ_ref
//! ```
//!
//! and exposes the impedance wrench `F = −K·e − D·ė`. Mapping the wrench
//! back to joint torques (`τ = Jᵗ·F`, plus any Λ-shaped feed-forward) is left
//! to the caller.

use kine_common::consts::{FRAME_NAME_MAX, WRENCH_DIM};
use kine_common::model::{RigidBodyModel, Wrench};
use nalgebra::{Isometry3, Matrix6, Vector6};
use tracing::{debug, trace, warn};

use super::task::CartesianTask;
use crate::error::KineError;
use crate::linalg::{is_symmetric, reciprocal_condition};

type FrameName = heapless::String<FRAME_NAME_MAX>;

/// Reciprocal condition number of `J·B⁻¹·Jᵗ` below which Λ is not formed.
pub const TASK_INERTIA_RCOND_MIN: f64 = 1e-10;

/// Relative tolerance of the symmetry and definiteness checks on gains.
const SYMMETRY_RTOL: f64 = 1e-9;

// ─── Impedance ──────────────────────────────────────────────────────

/// Cartesian stiffness and damping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Impedance {
    /// Per-axis gains, assuming decoupled axes.
    Diagonal {
        stiffness: Vector6<f64>,
        damping: Vector6<f64>,
    },
    /// Full 6×6 gains; both must be symmetric positive semi-definite.
    Dense {
        stiffness: Matrix6<f64>,
        damping: Matrix6<f64>,
    },
}

impl Impedance {
    /// Diagonal impedance with `d = 2·√k`, critical damping for unit inertia.
    pub fn critically_damped(stiffness: Vector6<f64>) -> Self {
        Self::Diagonal {
            stiffness,
            damping: stiffness.map(|k| 2.0 * k.max(0.0).sqrt()),
        }
    }

    /// Validated `(K, D)` matrices.
    pub fn to_matrices(&self) -> Result<(Matrix6<f64>, Matrix6<f64>), KineError> {
        let (k, d) = match self {
            Self::Diagonal { stiffness, damping } => {
                (Matrix6::from_diagonal(stiffness), Matrix6::from_diagonal(damping))
            }
            Self::Dense { stiffness, damping } => (*stiffness, *damping),
        };
        check_gain("stiffness", &k)?;
        check_gain("damping", &d)?;
        Ok((k, d))
    }
}

fn check_gain(what: &str, m: &Matrix6<f64>) -> Result<(), KineError> {
    if !m.iter().all(|x| x.is_finite()) {
        return Err(KineError::InvalidImpedance(format!("{what} is not finite")));
    }
    if let Some(i) = (0..WRENCH_DIM).find(|&i| m[(i, i)] < 0.0) {
        return Err(KineError::InvalidImpedance(format!(
            "{what}[{i}][{i}] = {} is negative",
            m[(i, i)]
        )));
    }
    let tol = SYMMETRY_RTOL * m.amax().max(1.0);
    if !is_symmetric(m, tol) {
        return Err(KineError::InvalidImpedance(format!("{what} is not symmetric")));
    }
    let min_eig = m.symmetric_eigenvalues().min();
    if min_eig < -tol {
        return Err(KineError::InvalidImpedance(format!(
            "{what} is indefinite (smallest eigenvalue {min_eig})"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Gains {
    stiffness: Matrix6<f64>,
    damping: Matrix6<f64>,
}

// ─── Controller ─────────────────────────────────────────────────────

/// Task-space state and impedance of one control frame.
///
/// Cached quantities are zero until the first successful
/// [`CartesianImpController::update`]; a failed update leaves them as they
/// were.
#[derive(Debug, Clone)]
pub struct CartesianImpController {
    nv: usize,
    control_frame: FrameName,
    task: CartesianTask,
    gains: Option<Gains>,

    task_inertia: Matrix6<f64>,
    pose: Isometry3<f64>,
    twist: Vector6<f64>,
    pose_err: Vector6<f64>,
    twist_err: Vector6<f64>,
}

impl CartesianImpController {
    /// Bind a controller to `control_frame` of `model`, or to its end-effector
    /// frame when `None`.
    pub fn new<M: RigidBodyModel + ?Sized>(
        model: &M,
        task: CartesianTask,
        control_frame: Option<&str>,
    ) -> Result<Self, KineError> {
        let frame = control_frame.unwrap_or_else(|| model.end_effector_frame());
        let jacobian = model.jacobian(frame)?;
        if jacobian.ncols() != model.nv() {
            return Err(KineError::DimensionMismatch {
                what: "jacobian cols",
                expected: model.nv(),
                actual: jacobian.ncols(),
            });
        }
        let control_frame = FrameName::try_from(frame)
            .map_err(|_| KineError::InvalidParameter(format!("frame name '{frame}' too long")))?;

        debug!(frame, nv = model.nv(), "cartesian impedance controller created");

        Ok(Self {
            nv: model.nv(),
            control_frame,
            task,
            gains: None,
            task_inertia: Matrix6::zeros(),
            pose: Isometry3::identity(),
            twist: Vector6::zeros(),
            pose_err: Vector6::zeros(),
            twist_err: Vector6::zeros(),
        })
    }

    /// Set stiffness and damping. Rejected gains leave the previous ones in
    /// place.
    pub fn set_cart_impedance(&mut self, impedance: Impedance) -> Result<(), KineError> {
        let (stiffness, damping) = impedance.to_matrices()?;
        self.gains = Some(Gains { stiffness, damping });
        debug!(
            stiffness = ?stiffness.diagonal().as_slice(),
            damping = ?damping.diagonal().as_slice(),
            "cartesian impedance set"
        );
        Ok(())
    }

    /// Refresh Λ, the measured pose and twist, and the task errors.
    pub fn update<M: RigidBodyModel + ?Sized>(&mut self, model: &M) -> Result<(), KineError> {
        if self.gains.is_none() {
            return Err(KineError::ImpedanceNotSet);
        }

        let frame = self.control_frame.as_str();
        let jacobian = model.jacobian(frame)?;
        self.check_model(model, jacobian.ncols())?;

        let chol = model.mass_matrix().clone().cholesky().ok_or_else(|| {
            KineError::InvalidParameter("mass matrix is not positive definite".to_string())
        })?;
        // B⁻¹·Jᵗ, n×6.
        let binv_jt = chol.solve(&jacobian.transpose());
        let jbjt = Matrix6::from_fn(|r, c| jacobian.row(r).tr_dot(&binv_jt.column(c)));
        let jbjt = (jbjt + jbjt.transpose()) * 0.5;

        let rcond = reciprocal_condition(&jbjt);
        let lambda = if rcond < TASK_INERTIA_RCOND_MIN {
            None
        } else {
            jbjt.cholesky().map(|c| c.inverse())
        };
        let Some(task_inertia) = lambda else {
            warn!(frame, rcond, "task-space inertia is singular");
            return Err(KineError::SingularTaskInertia { rcond });
        };

        let pose = model.frame_pose(frame)?;
        let twist: Vector6<f64> = jacobian * model.v();

        self.task_inertia = task_inertia;
        self.pose = pose;
        self.twist = twist;
        self.pose_err = self.task.compute_task_err(&pose);
        self.twist_err = self.task.compute_task_dot_err(&twist);

        trace!(
            frame,
            rcond,
            pose_err = self.pose_err.norm(),
            twist_err = self.twist_err.norm(),
            "impedance update"
        );
        Ok(())
    }

    fn check_model<M: RigidBodyModel + ?Sized>(
        &self,
        model: &M,
        jacobian_cols: usize,
    ) -> Result<(), KineError> {
        for (what, actual) in [
            ("model nv", model.nv()),
            ("jacobian cols", jacobian_cols),
            ("v", model.v().len()),
            ("mass matrix rows", model.mass_matrix().nrows()),
            ("mass matrix cols", model.mass_matrix().ncols()),
        ] {
            if actual != self.nv {
                return Err(KineError::DimensionMismatch {
                    what,
                    expected: self.nv,
                    actual,
                });
            }
        }
        Ok(())
    }

    // ─── Forces ─────────────────────────────────────────────────────

    /// `−K·e − D·ė` for the errors cached by the last update.
    pub fn impedance_force(&self) -> Result<Wrench, KineError> {
        self.compute_impedance_force(&self.pose_err, &self.twist_err)
    }

    /// `−K·e − D·ė` for arbitrary errors.
    pub fn compute_impedance_force(
        &self,
        pose_err: &Vector6<f64>,
        twist_err: &Vector6<f64>,
    ) -> Result<Wrench, KineError> {
        let gains = self.gains.as_ref().ok_or(KineError::ImpedanceNotSet)?;
        Ok(-(gains.stiffness * pose_err) - gains.damping * twist_err)
    }

    // ─── Accessors ──────────────────────────────────────────────────

    /// Λ from the last successful update.
    #[inline]
    pub fn task_inertia(&self) -> &Matrix6<f64> {
        &self.task_inertia
    }

    #[inline]
    pub fn stiffness(&self) -> Option<&Matrix6<f64>> {
        self.gains.as_ref().map(|g| &g.stiffness)
    }

    #[inline]
    pub fn damping(&self) -> Option<&Matrix6<f64>> {
        self.gains.as_ref().map(|g| &g.damping)
    }

    #[inline]
    pub fn pose_err(&self) -> &Vector6<f64> {
        &self.pose_err
    }

    #[inline]
    pub fn twist_err(&self) -> &Vector6<f64> {
        &self.twist_err
    }

    #[inline]
    pub fn measured_pose(&self) -> &Isometry3<f64> {
        &self.pose
    }

    #[inline]
    pub fn measured_twist(&self) -> &Vector6<f64> {
        &self.twist
    }

    #[inline]
    pub fn control_frame(&self) -> &str {
        &self.control_frame
    }

    #[inline]
    pub fn task(&self) -> &CartesianTask {
        &self.task
    }

    #[inline]
    pub fn task_mut(&mut self) -> &mut CartesianTask {
        &mut self.task
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
