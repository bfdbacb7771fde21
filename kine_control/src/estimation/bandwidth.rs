//! Observer bandwidth ↔ gain mapping.
//!
//! For a diagonal first-order observer `ẏ = k·(d − y)`, the bandwidth at the
//! attenuation point `a` (0.707 for −3 dB) is approximated by
//!
//! ```text
//! BW = −k / ln(1 − a)        k = −BW · ln(1 − a)
//! ```
//!
//! With `a = 0.707`, `BW = 10 Hz` maps to `k ≈ 12.28 s⁻¹`.

pub use kine_common::consts::BW_ATTENUATION_3DB;

use crate::error::KineError;

fn check_attenuation(attenuation: f64) -> Result<f64, KineError> {
    if !(attenuation > 0.0 && attenuation < 1.0) {
        return Err(KineError::InvalidParameter(format!(
            "attenuation {attenuation} must lie in (0, 1)"
        )));
    }
    Ok((1.0 - attenuation).ln())
}

/// Observer gain [1/s] for bandwidth `bw` [Hz] at the given attenuation.
pub fn bandwidth_to_gain(bw: f64, attenuation: f64) -> Result<f64, KineError> {
    let log_att = check_attenuation(attenuation)?;
    if !(bw > 0.0) || !bw.is_finite() {
        return Err(KineError::InvalidParameter(format!(
            "bandwidth {bw} must be finite and > 0"
        )));
    }
    Ok(-bw * log_att)
}

/// Bandwidth [Hz] reached by observer gain `k` [1/s] at the given attenuation.
pub fn gain_to_bandwidth(k: f64, attenuation: f64) -> Result<f64, KineError> {
    let log_att = check_attenuation(attenuation)?;
    if !(k > 0.0) || !k.is_finite() {
        return Err(KineError::InvalidParameter(format!(
            "gain {k} must be finite and > 0"
        )));
    }
    Ok(-k / log_att)
}
