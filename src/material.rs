//! Design vector and parameter bounds.
//!
//! The free parameters of the identification are the two isotropic material
//! constants of the model's MAT1 card: elastic (Young's) modulus and Poisson
//! ratio. Everything the DE operators touch goes through this pair.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{IdentError, Result};

/// One candidate's free parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialParams {
    /// Elastic (Young's) modulus in Pa.
    pub elastic_modulus: f64,
    /// Poisson ratio, dimensionless.
    pub poisson_ratio: f64,
}

impl MaterialParams {
    /// Creates a new parameter pair.
    pub fn new(elastic_modulus: f64, poisson_ratio: f64) -> Self {
        Self {
            elastic_modulus,
            poisson_ratio,
        }
    }
}

impl std::fmt::Display for MaterialParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "E={:7.3} GPa, v={:.3}",
            self.elastic_modulus / 1e9,
            self.poisson_ratio
        )
    }
}

/// Component-wise bound intervals for the design vector.
///
/// The Poisson upper bound is kept strictly below 0.5; an incompressible
/// material makes the eigenvalue problem degenerate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParamBounds {
    /// Lower bound for the elastic modulus in Pa.
    pub e_min: f64,
    /// Upper bound for the elastic modulus in Pa.
    pub e_max: f64,
    /// Upper bound for the Poisson ratio (lower bound is 0).
    pub v_max: f64,
}

impl Default for ParamBounds {
    fn default() -> Self {
        // Steel-to-ceramics modulus range, Poisson just below incompressible.
        Self {
            e_min: 1e9,
            e_max: 300e9,
            v_max: 0.5 - 1.0 / 1000.0,
        }
    }
}

impl ParamBounds {
    /// Validates the intervals.
    ///
    /// # Errors
    ///
    /// Returns `IdentError::InvalidBounds` if an interval is empty, a bound is
    /// not finite, `e_min` is negative, or `v_max` is outside (0, 0.5).
    pub fn validate(&self) -> Result<()> {
        if !self.e_min.is_finite() || !self.e_max.is_finite() || !self.v_max.is_finite() {
            return Err(IdentError::InvalidBounds {
                reason: "bounds must be finite".into(),
            });
        }
        if self.e_min < 0.0 {
            return Err(IdentError::InvalidBounds {
                reason: format!("e_min ({:e}) must be >= 0", self.e_min),
            });
        }
        if self.e_max <= self.e_min {
            return Err(IdentError::InvalidBounds {
                reason: format!("e_max ({:e}) must exceed e_min ({:e})", self.e_max, self.e_min),
            });
        }
        if self.v_max <= 0.0 || self.v_max >= 0.5 {
            return Err(IdentError::InvalidBounds {
                reason: format!("v_max ({}) must lie in (0, 0.5)", self.v_max),
            });
        }
        Ok(())
    }

    /// Clips a parameter pair component-wise into the bound intervals.
    pub fn clip(&self, params: MaterialParams) -> MaterialParams {
        MaterialParams {
            elastic_modulus: params.elastic_modulus.clamp(self.e_min, self.e_max),
            poisson_ratio: params.poisson_ratio.clamp(0.0, self.v_max),
        }
    }

    /// Returns `true` if both components lie inside the bound intervals.
    pub fn contains(&self, params: &MaterialParams) -> bool {
        params.elastic_modulus >= self.e_min
            && params.elastic_modulus <= self.e_max
            && params.poisson_ratio >= 0.0
            && params.poisson_ratio <= self.v_max
    }

    /// Draws a uniformly random parameter pair inside the bounds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> MaterialParams {
        let u: f64 = rng.random();
        let w: f64 = rng.random();
        MaterialParams {
            elastic_modulus: self.e_min + u * (self.e_max - self.e_min),
            poisson_ratio: w * self.v_max,
        }
    }
}
