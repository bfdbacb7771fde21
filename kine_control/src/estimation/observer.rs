//! Momentum-based contact force observer.
//!
//! Rigid-body dynamics with an unknown contact effort `τ_c`:
//! ```text
//! B(q)·q̈ + C(q, q̇)·q̇ + g(q) = τ + τ_c
//! ```
//! With the generalized momentum `p = B·q̇` and `Ḃ = C + Cᵗ`, the residual
//! ```text
//! ẏ = K·(ṗ − τ + g − Cᵗ·q̇ − y)
//! ```
//! is asymptotically stable for positive-definite K and converges to `τ_c`
//! without differentiating q̇.
//!
//! Integrating over one sample `h` with the trapezoidal rule for both the
//! residual and the `y` term gives the implicit update
//! ```text
//! (I + h/2·K)·y[k] = (I − h/2·K)·y[k-1] + K·(p[k] − p[k-1] + ∫ (g − τ − Cᵗ·q̇) dt)
//! S[k+1]·y[k]      = S[k]·y[k-1]        + K·(Δp + ∫r)
//! ```
//! `S[k+1]⁻¹` depends only on `h` and `K`, so it is computed once and
//! refreshed only when the bandwidth changes.
//!
//! The estimate is then mapped into a contact wrench through the frame
//! Jacobian (see [`super::wrench`]).

use kine_common::consts::FRAME_NAME_MAX;
use kine_common::model::{Force3D, RigidBodyModel, Torque3D, Wrench, split_wrench};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace, warn};

use super::bandwidth::{bandwidth_to_gain, gain_to_bandwidth};
use super::integrator::TrapezoidalIntegrator;
use super::selector::Selector;
use super::wrench::WrenchMap;
use crate::config::ObserverConfig;
use crate::error::KineError;

type FrameName = heapless::String<FRAME_NAME_MAX>;

/// Discrete transition matrices of the observer.
#[derive(Debug, Clone)]
struct Transition {
    /// K = k·I.
    k_mat: DMatrix<f64>,
    /// S[k] = I − h/2·K.
    s_k: DMatrix<f64>,
    /// S[k+1] = I + h/2·K.
    s_kp1: DMatrix<f64>,
    s_kp1_inv: DMatrix<f64>,
}

impl Transition {
    fn new(nv: usize, k: f64, dt: f64) -> Result<Self, KineError> {
        let k_mat = DMatrix::from_diagonal_element(nv, nv, k);
        let eye = DMatrix::<f64>::identity(nv, nv);
        let s_k = &eye - &k_mat * (0.5 * dt);
        let s_kp1 = &eye + &k_mat * (0.5 * dt);
        let s_kp1_inv = s_kp1.clone().try_inverse().ok_or_else(|| {
            KineError::InvalidParameter(format!("I + h/2·K not invertible (k = {k}, h = {dt})"))
        })?;
        Ok(Self {
            k_mat,
            s_k,
            s_kp1,
            s_kp1_inv,
        })
    }
}

/// Momentum-based observer of contact efforts and wrenches.
///
/// Driven once per control cycle through [`MomentumObserver::update`].
/// Estimates read before the first update are zero.
#[derive(Debug, Clone)]
pub struct MomentumObserver {
    nv: usize,
    dt: f64,
    bandwidth: f64,
    attenuation: f64,
    k: f64,
    transition: Transition,
    integrator: TrapezoidalIntegrator,
    map: WrenchMap,

    /// τ_c[k], observed contact joint efforts.
    tau_c: DVector<f64>,
    /// p[k-1].
    p_km1: DVector<f64>,
    wrench: Wrench,
    contact_frame: FrameName,
    samples: u64,

    // Per-cycle scratch buffers.
    p_k: DVector<f64>,
    residual: DVector<f64>,
    residual_int: DVector<f64>,
    drive: DVector<f64>,
    rhs: DVector<f64>,
}

impl MomentumObserver {
    /// Create an observer sized for `model`.
    ///
    /// Fails with `InvalidSelector` on malformed selectors and with
    /// `InvalidParameter` on a non-positive sample period or bandwidth, a
    /// negative regularization weight or an attenuation outside (0, 1).
    pub fn new<M: RigidBodyModel + ?Sized>(
        model: &M,
        config: &ObserverConfig,
    ) -> Result<Self, KineError> {
        config.validate()?;
        let (selector, jt_selector) = config.selectors()?;

        let nv = model.nv();
        if nv == 0 {
            return Err(KineError::InvalidParameter(
                "model has no degrees of freedom".to_string(),
            ));
        }

        let dt = config.sample_period;
        let k = bandwidth_to_gain(config.bandwidth, config.attenuation)?;
        let transition = Transition::new(nv, k, dt)?;
        let integrator = TrapezoidalIntegrator::new(nv, dt, dt)?;
        let map = WrenchMap::new(
            config.lambda,
            config.regularize_with_previous,
            selector,
            jt_selector,
        )?;

        debug!(
            nv,
            dt,
            bandwidth = config.bandwidth,
            k,
            lambda = config.lambda,
            regularize_with_previous = config.regularize_with_previous,
            "momentum observer created"
        );

        Ok(Self {
            nv,
            dt,
            bandwidth: config.bandwidth,
            attenuation: config.attenuation,
            k,
            transition,
            integrator,
            map,
            tau_c: DVector::zeros(nv),
            p_km1: DVector::zeros(nv),
            wrench: Wrench::zeros(),
            contact_frame: FrameName::new(),
            samples: 0,
            p_k: DVector::zeros(nv),
            residual: DVector::zeros(nv),
            residual_int: DVector::zeros(nv),
            drive: DVector::zeros(nv),
            rhs: DVector::zeros(nv),
        })
    }

    /// Advance the observer by one sample using the current model snapshot
    /// and map the result onto the wrench at `contact_frame`.
    ///
    /// An unknown frame or a model of the wrong size is rejected before any
    /// state changes. `IllConditionedMap` is reported after the effort
    /// estimate has advanced: without regularization the previous wrench is
    /// kept, with regularization the best-effort wrench is stored.
    pub fn update<M: RigidBodyModel + ?Sized>(
        &mut self,
        model: &M,
        contact_frame: &str,
    ) -> Result<(), KineError> {
        let jacobian = model.jacobian(contact_frame)?;
        self.check_model(model)?;
        if jacobian.ncols() != self.nv {
            return Err(KineError::DimensionMismatch {
                what: "jacobian cols",
                expected: self.nv,
                actual: jacobian.ncols(),
            });
        }
        if self.contact_frame.as_str() != contact_frame {
            self.contact_frame = FrameName::try_from(contact_frame).map_err(|_| {
                KineError::InvalidParameter(format!("frame name '{contact_frame}' too long"))
            })?;
        }

        self.compute_tau_c(model)?;
        self.samples += 1;

        trace!(
            sample = self.samples,
            frame = contact_frame,
            tau_c_norm = self.tau_c.norm(),
            "observer step"
        );

        match self.map.solve(jacobian, &self.tau_c, &self.wrench) {
            Ok(sol) => {
                self.wrench = sol.wrench;
                if sol.is_well_conditioned() {
                    Ok(())
                } else {
                    warn!(
                        frame = contact_frame,
                        rcond = sol.rcond,
                        "wrench map poorly conditioned, keeping regularized estimate"
                    );
                    Err(KineError::IllConditionedMap { rcond: sol.rcond })
                }
            }
            Err(e) => {
                warn!(frame = contact_frame, error = %e, "wrench map failed, holding previous estimate");
                Err(e)
            }
        }
    }

    fn check_model<M: RigidBodyModel + ?Sized>(&self, model: &M) -> Result<(), KineError> {
        let checks: [(&'static str, usize); 7] = [
            ("model nv", model.nv()),
            ("v", model.v().len()),
            ("tau", model.tau().len()),
            ("gravity", model.gravity().len()),
            ("mass matrix rows", model.mass_matrix().nrows()),
            ("mass matrix cols", model.mass_matrix().ncols()),
            ("coriolis rows", model.coriolis().nrows()),
        ];
        for (what, actual) in checks {
            if actual != self.nv {
                return Err(KineError::DimensionMismatch {
                    what,
                    expected: self.nv,
                    actual,
                });
            }
        }
        if model.coriolis().ncols() != self.nv {
            return Err(KineError::DimensionMismatch {
                what: "coriolis cols",
                expected: self.nv,
                actual: model.coriolis().ncols(),
            });
        }
        Ok(())
    }

    /// One discrete observer step; updates τ_c[k] and p[k-1].
    fn compute_tau_c<M: RigidBodyModel + ?Sized>(&mut self, model: &M) -> Result<(), KineError> {
        let v = model.v();

        // p[k] = B·v
        self.p_k.gemv(1.0, model.mass_matrix(), v, 0.0);

        // r[k] = g − τ − Cᵗ·v
        self.residual.copy_from(model.gravity());
        self.residual -= model.tau();
        self.residual.gemv_tr(-1.0, model.coriolis(), v, 1.0);

        self.integrator.add_sample(&self.residual)?;
        self.integrator.integral_into(&mut self.residual_int);

        // K·(p[k] − p[k-1] + ∫r) + S[k]·y[k-1]
        self.drive.copy_from(&self.p_k);
        self.drive -= &self.p_km1;
        self.drive += &self.residual_int;
        self.rhs.gemv(1.0, &self.transition.k_mat, &self.drive, 0.0);
        self.rhs.gemv(1.0, &self.transition.s_k, &self.tau_c, 1.0);

        // y[k] = S[k+1]⁻¹·rhs
        self.tau_c.gemv(1.0, &self.transition.s_kp1_inv, &self.rhs, 0.0);

        self.p_km1.copy_from(&self.p_k);
        Ok(())
    }

    /// Change the observer bandwidth [Hz] and rebuild the transition matrices.
    ///
    /// Observer memory is kept, so the estimate continues smoothly.
    pub fn set_bandwidth(&mut self, bandwidth: f64) -> Result<(), KineError> {
        let k = bandwidth_to_gain(bandwidth, self.attenuation)?;
        self.transition = Transition::new(self.nv, k, self.dt)?;
        self.k = k;
        self.bandwidth = bandwidth;
        debug!(bandwidth, k, "observer bandwidth changed");
        Ok(())
    }

    /// Clear all observer memory back to the zero initial state.
    pub fn reset(&mut self) {
        self.tau_c.fill(0.0);
        self.p_km1.fill(0.0);
        self.wrench = Wrench::zeros();
        self.integrator.reset();
        self.contact_frame.clear();
        self.samples = 0;
    }

    // ─── Accessors ──────────────────────────────────────────────────

    /// Observed contact joint efforts τ_c.
    #[inline]
    pub fn tau_obs(&self) -> &DVector<f64> {
        &self.tau_c
    }

    /// Estimated contact wrench `[force; torque]`.
    #[inline]
    pub fn wrench_est(&self) -> Wrench {
        self.wrench
    }

    /// Estimated contact force.
    #[inline]
    pub fn force_est(&self) -> Force3D {
        split_wrench(&self.wrench).0
    }

    /// Estimated contact torque.
    #[inline]
    pub fn torque_est(&self) -> Torque3D {
        split_wrench(&self.wrench).1
    }

    /// Observer gain k [1/s].
    #[inline]
    pub fn gain(&self) -> f64 {
        self.k
    }

    /// Observer bandwidth [Hz].
    #[inline]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Bandwidth actually achieved by the current gain, for diagnostics.
    pub fn effective_bandwidth(&self) -> Result<f64, KineError> {
        gain_to_bandwidth(self.k, self.attenuation)
    }

    #[inline]
    pub fn sample_period(&self) -> f64 {
        self.dt
    }

    #[inline]
    pub fn nv(&self) -> usize {
        self.nv
    }

    /// Frame used by the last update (empty before the first one).
    #[inline]
    pub fn contact_frame(&self) -> &str {
        self.contact_frame.as_str()
    }

    #[inline]
    pub fn selector(&self) -> &Selector {
        self.map.selector()
    }

    #[inline]
    pub fn jt_selector(&self) -> &Selector {
        self.map.jt_selector()
    }

    #[inline]
    pub fn lambda(&self) -> f64 {
        self.map.lambda()
    }

    /// Number of completed observer steps.
    #[inline]
    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    /// `I + h/2·K`.
    #[inline]
    pub fn transition_matrix(&self) -> &DMatrix<f64> {
        &self.transition.s_kp1
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
