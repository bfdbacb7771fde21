//! Cartesian impedance scenarios.
//!
//! Verifies:
//! 1. A simulated point mass under the impedance wrench settles at the reference.
//! 2. A failed update keeps the last good state.
//! 3. Observer and controller share one model snapshot per cycle.

use approx::assert_relative_eq;
use kine_common::model::{FrameJacobian, RigidBodyModel};
use kine_common::snapshot::DynamicsSnapshot;
use kine_control::cartesian::impedance::{CartesianImpController, Impedance};
use kine_control::cartesian::task::{CartesianTask, TaskReference};
use kine_control::config::ObserverConfig;
use kine_control::error::KineError;
use kine_control::estimation::observer::MomentumObserver;
use nalgebra::{DMatrix, DVector, Isometry3, Translation3, UnitQuaternion, Vector3, Vector6};

const DT: f64 = 0.001; // 1 kHz
const TIP: &str = "tip";

fn stiffness() -> Vector6<f64> {
    Vector6::new(100.0, 100.0, 100.0, 10.0, 10.0, 10.0)
}

/// Six decoupled unit-mass joints, one per Cartesian axis.
fn cartesian_point_mass() -> DynamicsSnapshot {
    let mut model = DynamicsSnapshot::new(6, TIP).unwrap();
    model
        .set_frame(TIP, Isometry3::identity(), &FrameJacobian::identity(6))
        .unwrap();
    model
}

fn set_pose(model: &mut DynamicsSnapshot, x: &DVector<f64>) {
    let pose = Isometry3::from_parts(
        Translation3::new(x[0], x[1], x[2]),
        UnitQuaternion::from_scaled_axis(Vector3::new(x[3], x[4], x[5])),
    );
    model
        .set_frame(TIP, pose, &FrameJacobian::identity(6))
        .unwrap();
}

// ─── Test 1: closed loop settles at the reference ──────────────────

#[test]
fn test_point_mass_settles_at_reference() {
    let mut model = cartesian_point_mass();
    let target = Isometry3::new(Vector3::new(0.05, -0.02, 0.01), Vector3::zeros());
    let mut ctrl =
        CartesianImpController::new(&model, CartesianTask::new(TaskReference::hold(target)), None)
            .unwrap();
    ctrl.set_cart_impedance(Impedance::critically_damped(stiffness()))
        .unwrap();

    let zeros = DVector::zeros(6);
    let mut x = DVector::zeros(6);
    let mut v = DVector::zeros(6);
    for _ in 0..5000 {
        set_pose(&mut model, &x);
        model.set_joint_state(&zeros, &v, &zeros, &zeros).unwrap();
        ctrl.update(&model).unwrap();

        // Λ = I, so the wrench is the acceleration.
        let f = ctrl.impedance_force().unwrap();
        for i in 0..6 {
            v[i] += f[i] * DT;
            x[i] += v[i] * DT;
        }
    }

    assert_relative_eq!(x[0], 0.05, epsilon = 1e-4);
    assert_relative_eq!(x[1], -0.02, epsilon = 1e-4);
    assert_relative_eq!(x[2], 0.01, epsilon = 1e-4);
    assert!(ctrl.pose_err().norm() < 1e-4);
    assert_eq!(*ctrl.task_inertia(), nalgebra::Matrix6::identity());
}

// ─── Test 2: singular configuration keeps last good state ──────────

#[test]
fn test_singular_update_keeps_previous_state() {
    let mut model = cartesian_point_mass();
    let mut ctrl = CartesianImpController::new(&model, CartesianTask::default(), None).unwrap();
    ctrl.set_cart_impedance(Impedance::critically_damped(stiffness()))
        .unwrap();
    ctrl.update(&model).unwrap();
    let lambda = *ctrl.task_inertia();

    let mut jacobian = FrameJacobian::identity(6);
    jacobian.row_mut(3).fill(0.0);
    model
        .set_frame(TIP, Isometry3::new(Vector3::x(), Vector3::zeros()), &jacobian)
        .unwrap();

    let err = ctrl.update(&model).unwrap_err();
    assert!(matches!(err, KineError::SingularTaskInertia { .. }));
    assert_eq!(*ctrl.task_inertia(), lambda);
    assert_eq!(*ctrl.measured_pose(), Isometry3::identity());
}

// ─── Test 3: one snapshot drives both components ───────────────────

#[test]
fn test_shared_snapshot_drives_observer_and_controller() {
    let mut model = cartesian_point_mass();
    let mass = DMatrix::from_diagonal(&DVector::from_column_slice(&[
        2.0, 2.0, 2.0, 0.5, 0.5, 0.5,
    ]));
    model
        .set_dynamics(&mass, &DMatrix::zeros(6, 6), &DVector::zeros(6))
        .unwrap();

    let mut observer = MomentumObserver::new(&model, &ObserverConfig::default()).unwrap();
    let mut ctrl = CartesianImpController::new(&model, CartesianTask::default(), Some(TIP)).unwrap();
    ctrl.set_cart_impedance(Impedance::critically_damped(stiffness()))
        .unwrap();

    let tau = DVector::from_element(6, 0.4);
    let zeros = DVector::zeros(6);
    model.set_joint_state(&zeros, &zeros, &zeros, &tau).unwrap();
    for _ in 0..100 {
        observer.update(&model, TIP).unwrap();
        ctrl.update(&model).unwrap();
    }

    assert_eq!(observer.nv(), model.nv());
    assert_eq!(observer.sample_count(), 100);
    assert!(observer.tau_obs().iter().all(|t| *t < 0.0));

    // Λ_ii = B_ii for J = I.
    assert_relative_eq!(ctrl.task_inertia()[(0, 0)], 2.0, epsilon = 1e-12);
    assert_relative_eq!(ctrl.task_inertia()[(5, 5)], 0.5, epsilon = 1e-12);
}
