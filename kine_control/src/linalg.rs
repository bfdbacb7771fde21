//! Small dense linear-algebra helpers shared by the observer and the
//! impedance controller.

use nalgebra::Matrix6;

/// Ratio of smallest to largest eigenvalue of a symmetric PSD 6×6 matrix.
///
/// Returns 0 for a zero, indefinite-to-the-point-of-negative, or non-finite
/// matrix.
pub fn reciprocal_condition(m: &Matrix6<f64>) -> f64 {
    if !m.iter().all(|x| x.is_finite()) {
        return 0.0;
    }
    let eig = m.symmetric_eigenvalues();
    let max = eig.max();
    if !(max > 0.0) {
        return 0.0;
    }
    (eig.min() / max).max(0.0)
}

/// Returns true if `m` equals its transpose within `tol` (absolute).
pub fn is_symmetric(m: &Matrix6<f64>, tol: f64) -> bool {
    (0..6).all(|r| (r + 1..6).all(|c| (m[(r, c)] - m[(c, r)]).abs() <= tol))
}
