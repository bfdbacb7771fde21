//! TOML configuration for observer and impedance sessions.
//!
//! ```toml
//! [shared]
//! log_level = "debug"
//! session_name = "leg-01"
//!
//! [observer]
//! sample_period = 0.001
//! bandwidth = 10.0
//! lambda = 1.0
//! regularize_with_previous = false
//! selector = [0, 1, 2]
//!
//! [impedance]
//! control_frame = "tip"
//! stiffness = [100.0, 100.0, 100.0, 10.0, 10.0, 10.0]
//! damping = [20.0, 20.0, 20.0, 6.3, 6.3, 6.3]
//! ```
//!
//! Every table and field is optional and falls back to the documented
//! defaults. `stiffness` / `damping` accept either a 6-vector (diagonal
//! impedance) or six rows of six values (dense 6×6 matrix).

use std::path::Path;

use kine_common::config::{ConfigError, ConfigLoader, SharedConfig};
use kine_common::consts::{
    BW_ATTENUATION_3DB, DEFAULT_BANDWIDTH_HZ, DEFAULT_LAMBDA, DEFAULT_SAMPLE_PERIOD, WRENCH_DIM,
};
use nalgebra::{Matrix6, Vector6};
use serde::{Deserialize, Serialize};

use crate::cartesian::impedance::Impedance;
use crate::error::KineError;
use crate::estimation::selector::Selector;

// ─── Observer ───────────────────────────────────────────────────────

/// Construction parameters of the momentum observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObserverConfig {
    /// Sample period h [s].
    #[serde(default = "default_sample_period")]
    pub sample_period: f64,
    /// Observer bandwidth [Hz].
    #[serde(default = "default_bandwidth")]
    pub bandwidth: f64,
    /// Regularization weight λ of the wrench mapping (0 = none).
    #[serde(default = "default_lambda")]
    pub lambda: f64,
    /// Regularize toward the previous wrench instead of zero.
    #[serde(default)]
    pub regularize_with_previous: bool,
    /// Wrench components to estimate.
    #[serde(default = "default_selector")]
    pub selector: Vec<usize>,
    /// Jacobian rows used by the wrench fit (defaults to `selector`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jt_selector: Option<Vec<usize>>,
    /// Attenuation defining the bandwidth (0.707 = −3 dB).
    #[serde(default = "default_attenuation")]
    pub attenuation: f64,
}

fn default_sample_period() -> f64 {
    DEFAULT_SAMPLE_PERIOD
}

fn default_bandwidth() -> f64 {
    DEFAULT_BANDWIDTH_HZ
}

fn default_lambda() -> f64 {
    DEFAULT_LAMBDA
}

fn default_selector() -> Vec<usize> {
    (0..WRENCH_DIM).collect()
}

fn default_attenuation() -> f64 {
    BW_ATTENUATION_3DB
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            sample_period: default_sample_period(),
            bandwidth: default_bandwidth(),
            lambda: default_lambda(),
            regularize_with_previous: false,
            selector: default_selector(),
            jt_selector: None,
            attenuation: default_attenuation(),
        }
    }
}

impl ObserverConfig {
    /// Validate numeric bounds and selectors.
    pub fn validate(&self) -> Result<(), KineError> {
        if !(self.sample_period > 0.0) || !self.sample_period.is_finite() {
            return Err(KineError::InvalidParameter(format!(
                "sample_period {} must be finite and > 0",
                self.sample_period
            )));
        }
        if !(self.bandwidth > 0.0) || !self.bandwidth.is_finite() {
            return Err(KineError::InvalidParameter(format!(
                "bandwidth {} must be finite and > 0",
                self.bandwidth
            )));
        }
        if !(self.lambda >= 0.0) || !self.lambda.is_finite() {
            return Err(KineError::InvalidParameter(format!(
                "lambda {} must be finite and >= 0",
                self.lambda
            )));
        }
        if !(self.attenuation > 0.0 && self.attenuation < 1.0) {
            return Err(KineError::InvalidParameter(format!(
                "attenuation {} out of range (0, 1)",
                self.attenuation
            )));
        }
        self.selectors().map(|_| ())
    }

    /// Build the `(wrench, jacobian)` selector pair.
    pub fn selectors(&self) -> Result<(Selector, Selector), KineError> {
        let selector = Selector::new(&self.selector)?;
        let jt_selector = match &self.jt_selector {
            Some(indices) => Selector::new(indices)?,
            None => selector.clone(),
        };
        Ok((selector, jt_selector))
    }
}

// ─── Impedance ──────────────────────────────────────────────────────

/// Stiffness or damping, as a diagonal 6-vector or a dense 6×6 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GainSpec {
    Diagonal([f64; WRENCH_DIM]),
    Dense([[f64; WRENCH_DIM]; WRENCH_DIM]),
}

impl GainSpec {
    fn to_matrix(self) -> Matrix6<f64> {
        match self {
            Self::Diagonal(d) => Matrix6::from_diagonal(&Vector6::from_column_slice(&d)),
            Self::Dense(rows) => Matrix6::from_fn(|r, c| rows[r][c]),
        }
    }
}

/// Impedance controller parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImpedanceConfig {
    /// Control frame (defaults to the model's end-effector frame).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_frame: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<GainSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping: Option<GainSpec>,
}

impl ImpedanceConfig {
    /// Impedance described by this config, `None` when neither gain is given.
    ///
    /// Two diagonal gains give [`Impedance::Diagonal`]; any dense gain
    /// promotes both to [`Impedance::Dense`].
    pub fn impedance(&self) -> Result<Option<Impedance>, KineError> {
        let impedance = match (self.stiffness, self.damping) {
            (None, None) => return Ok(None),
            (Some(GainSpec::Diagonal(k)), Some(GainSpec::Diagonal(d))) => Impedance::Diagonal {
                stiffness: Vector6::from_column_slice(&k),
                damping: Vector6::from_column_slice(&d),
            },
            (Some(k), Some(d)) => Impedance::Dense {
                stiffness: k.to_matrix(),
                damping: d.to_matrix(),
            },
            _ => {
                return Err(KineError::InvalidImpedance(
                    "stiffness and damping must be given together".to_string(),
                ));
            }
        };
        impedance.to_matrices()?;
        Ok(Some(impedance))
    }
}

// ─── Session ────────────────────────────────────────────────────────

/// Complete session configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub observer: ObserverConfig,
    #[serde(default)]
    pub impedance: ImpedanceConfig,
}

impl ControlConfig {
    /// Run all validation rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.observer
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("observer: {e}")))?;
        self.impedance
            .impedance()
            .map_err(|e| ConfigError::ValidationError(format!("impedance: {e}")))?;
        Ok(())
    }
}

/// Load and validate a session configuration file.
pub fn load_config(path: &Path) -> Result<ControlConfig, ConfigError> {
    let config = ControlConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a session configuration from a TOML string.
pub fn load_config_from_str(content: &str) -> Result<ControlConfig, ConfigError> {
    let config = ControlConfig::from_toml_str(content)?;
    config.validate()?;
    Ok(config)
}

// ─── Tests ──────────────────────────────────────────────────────────
