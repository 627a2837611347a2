//! RMSE fitness against the target frequency set.

use ndarray::Array1;

use crate::error::{IdentError, Result};

/// Root-mean-square deviation between predicted and target frequencies.
///
/// Lower is better; 0 is a perfect match. Index alignment is strict: the
/// predicted vector must have exactly as many modes as the target.
///
/// # Errors
///
/// Returns `IdentError::DimensionMismatch` when the lengths differ and
/// `IdentError::EmptyTarget` when the target has no modes at all.
pub fn rmse(frequencies: &Array1<f64>, target: &Array1<f64>) -> Result<f64> {
    if target.is_empty() {
        return Err(IdentError::EmptyTarget);
    }
    if frequencies.len() != target.len() {
        return Err(IdentError::DimensionMismatch {
            expected: target.len(),
            got: frequencies.len(),
        });
    }
    let sum_sq: f64 = frequencies
        .iter()
        .zip(target.iter())
        .map(|(f, t)| (f - t) * (f - t))
        .sum();
    Ok((sum_sq / target.len() as f64).sqrt())
}
