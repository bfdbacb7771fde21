//! Trapezoidal (Tustin) numerical integration over a sliding window.
//!
//! Keeps the last `N + 1` samples of a vector signal, where
//! `N = round(horizon / dt)` is the number of integration intervals, and
//! returns
//!
//! ```text
//! ∫ x dt ≈ dt · Σ_{i=1..N} (x[i-1] + x[i]) / 2
//!        = dt · (Σ x − (x_oldest + x_newest) / 2)
//! ```
//!
//! Memory is zero-initialized, so before the window fills the missing
//! samples contribute zero. Storage is allocated once at construction.

use nalgebra::{DMatrix, DVector};

use crate::error::KineError;

#[derive(Debug, Clone)]
pub struct TrapezoidalIntegrator {
    dt: f64,
    /// One column per sample, ring-ordered.
    samples: DMatrix<f64>,
    /// Column holding the newest sample.
    head: usize,
}

impl TrapezoidalIntegrator {
    /// Create an integrator for `dim`-vectors sampled every `dt` seconds,
    /// integrating over the last `horizon` seconds (at least one interval).
    pub fn new(dim: usize, dt: f64, horizon: f64) -> Result<Self, KineError> {
        if dim == 0 {
            return Err(KineError::InvalidParameter(
                "integrator dimension must be > 0".to_string(),
            ));
        }
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(KineError::InvalidParameter(format!(
                "integrator dt {dt} must be finite and > 0"
            )));
        }
        if !(horizon > 0.0) || !horizon.is_finite() {
            return Err(KineError::InvalidParameter(format!(
                "integrator horizon {horizon} must be finite and > 0"
            )));
        }

        let intervals = ((horizon / dt).round() as usize).max(1);

        Ok(Self {
            dt,
            samples: DMatrix::zeros(dim, intervals + 1),
            head: 0,
        })
    }

    /// Number of integration intervals in the window.
    #[inline]
    pub fn intervals(&self) -> usize {
        self.samples.ncols() - 1
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.samples.nrows()
    }

    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Push a new sample, evicting the oldest one.
    pub fn add_sample(&mut self, sample: &DVector<f64>) -> Result<(), KineError> {
        if sample.len() != self.dim() {
            return Err(KineError::DimensionMismatch {
                what: "integrator sample",
                expected: self.dim(),
                actual: sample.len(),
            });
        }
        self.head = (self.head + 1) % self.samples.ncols();
        self.samples.set_column(self.head, sample);
        Ok(())
    }

    /// Write the windowed integral into `out` (must have length `dim`).
    pub fn integral_into(&self, out: &mut DVector<f64>) {
        let cols = self.samples.ncols();
        let oldest = (self.head + 1) % cols;

        out.fill(0.0);
        for c in 0..cols {
            *out += self.samples.column(c);
        }
        *out -= 0.5 * (self.samples.column(oldest) + self.samples.column(self.head));
        *out *= self.dt;
    }

    /// Windowed integral as a new vector.
    pub fn integral(&self) -> DVector<f64> {
        let mut out = DVector::zeros(self.dim());
        self.integral_into(&mut out);
        out
    }

    /// Zero the sample memory.
    #[inline]
    pub fn reset(&mut self) {
        self.samples.fill(0.0);
        self.head = 0;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
