//! Owned per-cycle model adapter.
//!
//! `DynamicsSnapshot` stores the outputs of an external rigid-body dynamics
//! library for one control cycle. The control loop refreshes it before any
//! dependent component runs:
//!
//! ```text
//! snapshot.set_joint_state(q, v, a, tau)
//! snapshot.set_dynamics(B, C, g)
//! snapshot.set_frame("tip", pose, J)
//! observer.update(&snapshot, "tip")
//! controller.update(&snapshot)
//! ```
//!
//! All setters validate dimensions against `nv` and copy into pre-allocated
//! storage, so refreshing an already registered frame does not allocate.

use nalgebra::{DMatrix, DVector, Isometry3};

use crate::consts::{FRAME_NAME_MAX, MAX_FRAMES};
use crate::model::{FrameJacobian, ModelError, RigidBodyModel};

type FrameName = heapless::String<FRAME_NAME_MAX>;

#[derive(Debug, Clone)]
struct FrameEntry {
    name: FrameName,
    pose: Isometry3<f64>,
    jacobian: FrameJacobian,
}

/// Snapshot of joint state, dynamics terms and frame kinematics.
#[derive(Debug, Clone)]
pub struct DynamicsSnapshot {
    nv: usize,
    q: DVector<f64>,
    v: DVector<f64>,
    a: DVector<f64>,
    tau: DVector<f64>,
    mass: DMatrix<f64>,
    coriolis: DMatrix<f64>,
    gravity: DVector<f64>,
    frames: heapless::Vec<FrameEntry, MAX_FRAMES>,
    end_effector: FrameName,
}

fn frame_name(name: &str) -> Result<FrameName, ModelError> {
    FrameName::try_from(name).map_err(|_| ModelError::FrameNameTooLong(name.to_string()))
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), ModelError> {
    if expected != actual {
        return Err(ModelError::DimensionMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

impl DynamicsSnapshot {
    /// Create a snapshot for a model with `nv` degrees of freedom.
    ///
    /// Joint vectors start at zero, the mass matrix at identity. The
    /// end-effector frame is registered with an identity pose and a zero
    /// Jacobian until the first [`DynamicsSnapshot::set_frame`].
    pub fn new(nv: usize, end_effector: &str) -> Result<Self, ModelError> {
        let end_effector = frame_name(end_effector)?;
        let mut frames = heapless::Vec::new();
        frames
            .push(FrameEntry {
                name: end_effector.clone(),
                pose: Isometry3::identity(),
                jacobian: FrameJacobian::zeros(nv),
            })
            .map_err(|_| ModelError::FrameCapacityExceeded)?;

        Ok(Self {
            nv,
            q: DVector::zeros(nv),
            v: DVector::zeros(nv),
            a: DVector::zeros(nv),
            tau: DVector::zeros(nv),
            mass: DMatrix::identity(nv, nv),
            coriolis: DMatrix::zeros(nv, nv),
            gravity: DVector::zeros(nv),
            frames,
            end_effector,
        })
    }

    /// Refresh the joint state (q, v, a, τ).
    pub fn set_joint_state(
        &mut self,
        q: &DVector<f64>,
        v: &DVector<f64>,
        a: &DVector<f64>,
        tau: &DVector<f64>,
    ) -> Result<(), ModelError> {
        check_len("q", self.nv, q.len())?;
        check_len("v", self.nv, v.len())?;
        check_len("a", self.nv, a.len())?;
        check_len("tau", self.nv, tau.len())?;

        self.q.copy_from(q);
        self.v.copy_from(v);
        self.a.copy_from(a);
        self.tau.copy_from(tau);
        Ok(())
    }

    /// Refresh the dynamics terms B(q), C(q, v) and g(q).
    pub fn set_dynamics(
        &mut self,
        mass: &DMatrix<f64>,
        coriolis: &DMatrix<f64>,
        gravity: &DVector<f64>,
    ) -> Result<(), ModelError> {
        check_len("mass matrix rows", self.nv, mass.nrows())?;
        check_len("mass matrix cols", self.nv, mass.ncols())?;
        check_len("coriolis rows", self.nv, coriolis.nrows())?;
        check_len("coriolis cols", self.nv, coriolis.ncols())?;
        check_len("gravity", self.nv, gravity.len())?;

        self.mass.copy_from(mass);
        self.coriolis.copy_from(coriolis);
        self.gravity.copy_from(gravity);
        Ok(())
    }

    /// Register or refresh a frame's pose and Jacobian.
    pub fn set_frame(
        &mut self,
        name: &str,
        pose: Isometry3<f64>,
        jacobian: &FrameJacobian,
    ) -> Result<(), ModelError> {
        check_len("jacobian cols", self.nv, jacobian.ncols())?;

        if let Some(entry) = self.frames.iter_mut().find(|f| f.name.as_str() == name) {
            entry.pose = pose;
            entry.jacobian.copy_from(jacobian);
            return Ok(());
        }

        let entry = FrameEntry {
            name: frame_name(name)?,
            pose,
            jacobian: jacobian.clone(),
        };
        self.frames
            .push(entry)
            .map_err(|_| ModelError::FrameCapacityExceeded)
    }

    /// Returns true if `name` is a registered frame.
    pub fn has_frame(&self, name: &str) -> bool {
        self.frames.iter().any(|f| f.name.as_str() == name)
    }

    /// Number of registered frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, name: &str) -> Result<&FrameEntry, ModelError> {
        self.frames
            .iter()
            .find(|f| f.name.as_str() == name)
            .ok_or_else(|| ModelError::UnknownFrame(name.to_string()))
    }
}

impl RigidBodyModel for DynamicsSnapshot {
    #[inline]
    fn nv(&self) -> usize {
        self.nv
    }

    #[inline]
    fn q(&self) -> &DVector<f64> {
        &self.q
    }

    #[inline]
    fn v(&self) -> &DVector<f64> {
        &self.v
    }

    #[inline]
    fn a(&self) -> &DVector<f64> {
        &self.a
    }

    #[inline]
    fn tau(&self) -> &DVector<f64> {
        &self.tau
    }

    #[inline]
    fn mass_matrix(&self) -> &DMatrix<f64> {
        &self.mass
    }

    #[inline]
    fn coriolis(&self) -> &DMatrix<f64> {
        &self.coriolis
    }

    #[inline]
    fn gravity(&self) -> &DVector<f64> {
        &self.gravity
    }

    fn jacobian(&self, frame: &str) -> Result<&FrameJacobian, ModelError> {
        self.frame(frame).map(|f| &f.jacobian)
    }

    fn frame_pose(&self, frame: &str) -> Result<Isometry3<f64>, ModelError> {
        self.frame(frame).map(|f| f.pose)
    }

    fn end_effector_frame(&self) -> &str {
        self.end_effector.as_str()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
