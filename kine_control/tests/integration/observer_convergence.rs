//! Observer convergence on simulated plants.
//!
//! Verifies:
//! 1. A constant disturbance on a moving single-joint mass is recovered.
//! 2. Regularizing toward the previous wrench converges to the least-squares wrench.
//! 3. Regularizing toward zero settles at the shrunk wrench.
//! 4. Components outside any selector subset stay exactly zero.

use approx::assert_relative_eq;
use kine_common::model::FrameJacobian;
use kine_common::snapshot::DynamicsSnapshot;
use kine_control::config::ObserverConfig;
use kine_control::estimation::observer::MomentumObserver;
use nalgebra::{DMatrix, DVector, Isometry3};

const DT: f64 = 0.001; // 1 kHz
const TIP: &str = "tip";

// ─── Helpers ────────────────────────────────────────────────────────

fn static_arm(nv: usize, jacobian: &FrameJacobian) -> DynamicsSnapshot {
    let mut model = DynamicsSnapshot::new(nv, TIP).unwrap();
    model.set_frame(TIP, Isometry3::identity(), jacobian).unwrap();
    model
}

/// Hold a 6-joint arm still under constant commanded torque for `steps`
/// cycles and return the observer.
fn hold_still(config: &ObserverConfig, tau: &DVector<f64>, steps: usize) -> MomentumObserver {
    let model = {
        let mut m = static_arm(6, &FrameJacobian::identity(6));
        let zeros = DVector::zeros(6);
        m.set_joint_state(&zeros, &zeros, &zeros, tau).unwrap();
        m
    };
    let mut observer = MomentumObserver::new(&model, config).unwrap();
    for _ in 0..steps {
        observer.update(&model, TIP).unwrap();
    }
    observer
}

// ─── Test 1: moving mass with constant external effort ─────────────

#[test]
fn test_moving_mass_external_effort_recovered() {
    let mass = 2.0;
    let external = 1.0;

    let mut jacobian = FrameJacobian::zeros(1);
    jacobian[(0, 0)] = 1.0;
    let mut model = static_arm(1, &jacobian);
    model
        .set_dynamics(
            &DMatrix::from_element(1, 1, mass),
            &DMatrix::zeros(1, 1),
            &DVector::zeros(1),
        )
        .unwrap();

    let config = ObserverConfig {
        sample_period: DT,
        lambda: 0.0,
        selector: vec![0],
        ..Default::default()
    };
    let mut observer = MomentumObserver::new(&model, &config).unwrap();

    let zero = DVector::zeros(1);
    let mut v = 0.0;
    for k in 0..2000 {
        let tau = 0.5 * (k as f64 * DT).sin();
        model
            .set_joint_state(&zero, &DVector::from_element(1, v), &zero, &DVector::from_element(1, tau))
            .unwrap();
        observer.update(&model, TIP).unwrap();
        v += (tau + external) / mass * DT;
    }

    assert_relative_eq!(observer.tau_obs()[0], external, epsilon = 1e-2);
    assert_relative_eq!(observer.force_est()[0], external, epsilon = 1e-2);
    assert_eq!(observer.force_est()[1], 0.0);
    assert_eq!(observer.torque_est(), nalgebra::Vector3::zeros());
}

// ─── Test 2: regularize toward previous wrench ─────────────────────

#[test]
fn test_regularize_with_previous_converges_to_least_squares() {
    let tau = DVector::from_column_slice(&[1.0, -2.0, 0.5, 0.1, 0.0, -0.3]);
    let config = ObserverConfig {
        lambda: 1.0,
        regularize_with_previous: true,
        ..Default::default()
    };
    let observer = hold_still(&config, &tau, 3000);

    // Static arm: τ_c = −τ, and with J = I the least-squares wrench is τ_c.
    for i in 0..6 {
        assert_relative_eq!(observer.tau_obs()[i], -tau[i], epsilon = 1e-6);
        assert_relative_eq!(observer.wrench_est()[i], -tau[i], epsilon = 1e-6);
    }
}

// ─── Test 3: regularize toward zero ────────────────────────────────

#[test]
fn test_regularize_toward_zero_shrinks_wrench() {
    let tau = DVector::from_column_slice(&[1.0, -2.0, 0.5, 0.1, 0.0, -0.3]);
    let config = ObserverConfig {
        lambda: 1.0,
        ..Default::default()
    };
    let observer = hold_still(&config, &tau, 3000);

    // (1 + λ)·w = τ_c
    for i in 0..6 {
        assert_relative_eq!(observer.wrench_est()[i], -tau[i] / 2.0, epsilon = 1e-6);
    }
}

// ─── Test 4: selector masks hold over a long run ───────────────────

#[test]
fn test_angular_components_stay_zero_for_linear_selector() {
    let tau = DVector::from_column_slice(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
    let config = ObserverConfig {
        selector: vec![0, 1, 2],
        jt_selector: Some(vec![0, 1, 2, 3, 4, 5]),
        ..Default::default()
    };
    let observer = hold_still(&config, &tau, 500);

    assert_eq!(observer.torque_est(), nalgebra::Vector3::zeros());
    assert!(observer.force_est().iter().all(|f| *f < 0.0));
}

// ─── Test 5: every selector subset masks the rest ──────────────────

#[test]
fn test_every_selector_subset_zeroes_unselected_components() {
    let tau = DVector::from_column_slice(&[1.0, -2.0, 0.5, 0.1, -0.7, -0.3]);
    for mask in 0u8..64 {
        let selector: Vec<usize> = (0..6).filter(|i| mask & (1 << i) != 0).collect();
        let config = ObserverConfig {
            selector: selector.clone(),
            jt_selector: Some((0..6).collect()),
            ..Default::default()
        };
        let observer = hold_still(&config, &tau, 20);
        let wrench = observer.wrench_est();

        for i in 0..6 {
            if selector.contains(&i) {
                // Static arm: τ_c = −τ, so each estimate opposes its torque.
                assert!(wrench[i] * tau[i] < 0.0, "mask {mask:06b}: component {i} = {}", wrench[i]);
            } else {
                assert_eq!(wrench[i], 0.0, "mask {mask:06b}: component {i} leaked");
            }
        }
    }
}
