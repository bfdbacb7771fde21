//! Joint-effort → contact-wrench mapping.
//!
//! The observed residual efforts relate to the contact wrench through the
//! frame Jacobian, `τ_c = Jᵗ·w`. The wrench is recovered as the solution of
//! the regularized least-squares problem
//!
//! ```text
//! min_w ‖J_selᵗ·w − τ_c‖² + λ·‖w − w_reg‖²
//! (J_sel·J_selᵗ + λ·I)·w = J_sel·τ_c + λ·w_reg
//! ```
//!
//! `J_sel` keeps only the Jacobian rows listed in the Jacobian selector.
//! Unselected rows take no part in the fit: their wrench components settle
//! at `w_reg` when λ > 0 and at zero otherwise. `w_reg` is zero, or the
//! previous estimate when `regularize_with_previous` is set. The wrench
//! selector finally zeroes every component it does not list.

use kine_common::consts::WRENCH_DIM;
use kine_common::model::{FrameJacobian, Wrench};
use nalgebra::{DVector, Matrix6};

use super::selector::Selector;
use crate::error::KineError;
use crate::linalg::reciprocal_condition;

/// Reciprocal condition number below which the normal matrix is treated as
/// singular.
pub const MAP_RCOND_MIN: f64 = 1e-12;

/// Wrench returned by [`WrenchMap::solve`] together with the reciprocal
/// condition number of the normal matrix it was solved from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrenchSolution {
    pub wrench: Wrench,
    pub rcond: f64,
}

impl WrenchSolution {
    #[inline]
    pub fn is_well_conditioned(&self) -> bool {
        self.rcond >= MAP_RCOND_MIN
    }
}

/// Regularized, selector-masked least-squares wrench map.
#[derive(Debug, Clone, PartialEq)]
pub struct WrenchMap {
    lambda: f64,
    regularize_with_previous: bool,
    selector: Selector,
    jt_selector: Selector,
}

impl WrenchMap {
    pub fn new(
        lambda: f64,
        regularize_with_previous: bool,
        selector: Selector,
        jt_selector: Selector,
    ) -> Result<Self, KineError> {
        if !(lambda >= 0.0) || !lambda.is_finite() {
            return Err(KineError::InvalidParameter(format!(
                "regularization weight {lambda} must be finite and >= 0"
            )));
        }
        Ok(Self {
            lambda,
            regularize_with_previous,
            selector,
            jt_selector,
        })
    }

    #[inline]
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    #[inline]
    pub fn regularize_with_previous(&self) -> bool {
        self.regularize_with_previous
    }

    #[inline]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    #[inline]
    pub fn jt_selector(&self) -> &Selector {
        &self.jt_selector
    }

    /// Solve for the wrench explaining `tau_c` through `jacobian`.
    ///
    /// Without regularization a normal matrix whose reciprocal condition
    /// number falls below [`MAP_RCOND_MIN`] is rejected with
    /// `IllConditionedMap`. With λ > 0 the matrix is positive-definite and the
    /// regularized solution is returned together with its `rcond`, leaving the
    /// caller to decide what to do with a poorly conditioned fit.
    pub fn solve(
        &self,
        jacobian: &FrameJacobian,
        tau_c: &DVector<f64>,
        previous: &Wrench,
    ) -> Result<WrenchSolution, KineError> {
        if jacobian.ncols() != tau_c.len() {
            return Err(KineError::DimensionMismatch {
                what: "jacobian cols",
                expected: tau_c.len(),
                actual: jacobian.ncols(),
            });
        }

        let regularized = self.lambda > 0.0;
        let target = if regularized && self.regularize_with_previous {
            *previous
        } else {
            Wrench::zeros()
        };

        if self.jt_selector.is_empty() {
            let mut wrench = target;
            self.selector.apply(&mut wrench);
            return Ok(WrenchSolution { wrench, rcond: 1.0 });
        }

        // Normal equations restricted to the selected Jacobian rows.
        let mut normal = Matrix6::<f64>::zeros();
        let mut rhs = Wrench::zeros();
        for r in 0..WRENCH_DIM {
            if !self.jt_selector.contains(r) {
                continue;
            }
            rhs[r] = jacobian.row(r).tr_dot(tau_c) + self.lambda * target[r];
            for c in r..WRENCH_DIM {
                if self.jt_selector.contains(c) {
                    let v = jacobian.row(r).dot(&jacobian.row(c));
                    normal[(r, c)] = v;
                    normal[(c, r)] = v;
                }
            }
            normal[(r, r)] += self.lambda;
        }

        // Pin unselected rows at their target. Using the largest selected
        // diagonal keeps the spectrum of the selected block unchanged.
        let pin = (0..WRENCH_DIM)
            .filter(|&i| self.jt_selector.contains(i))
            .map(|i| normal[(i, i)])
            .fold(0.0_f64, f64::max);
        for i in 0..WRENCH_DIM {
            if !self.jt_selector.contains(i) {
                normal[(i, i)] = pin;
                rhs[i] = pin * target[i];
            }
        }

        let rcond = reciprocal_condition(&normal);
        if !regularized && rcond < MAP_RCOND_MIN {
            return Err(KineError::IllConditionedMap { rcond });
        }

        let mut wrench = normal
            .cholesky()
            .map(|chol| chol.solve(&rhs))
            .filter(|w| w.iter().all(|x| x.is_finite()))
            .ok_or(KineError::IllConditionedMap { rcond })?;

        self.selector.apply(&mut wrench);
        Ok(WrenchSolution { wrench, rcond })
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
