//! Candidate solution lifecycle.

use ndarray::Array1;
use std::path::PathBuf;

use crate::material::MaterialParams;

/// One candidate: a design vector plus everything derived from it.
///
/// The artifact handle is owned exclusively by the individual and is
/// regenerated whenever the design vector changes. Frequencies and fitness
/// stay unset until the candidate has been through a solver run.
#[derive(Debug, Clone)]
pub struct Individual {
    /// The free parameters being optimized.
    pub params: MaterialParams,
    /// Materialized solver input for these parameters, if any.
    pub artifact: Option<PathBuf>,
    /// Predicted modal frequencies from the last evaluation.
    pub frequencies: Array1<f64>,
    /// RMSE against the target vector, lower is better. `None` until
    /// evaluated or after a failed evaluation on a fresh candidate.
    pub fitness: Option<f64>,
    /// Generation index at creation, for diagnostics.
    pub generation: usize,
}

impl Individual {
    /// Creates an unevaluated candidate.
    pub fn new(params: MaterialParams, generation: usize) -> Self {
        Self {
            params,
            artifact: None,
            frequencies: Array1::zeros(0),
            fitness: None,
            generation,
        }
    }

    /// Returns `true` if this candidate has a usable fitness.
    ///
    /// A fitness of exactly zero backed by an empty frequency vector comes
    /// from a failed extraction, not a perfect fit, and is not usable.
    pub fn has_valid_fitness(&self) -> bool {
        match self.fitness {
            Some(f) => f.is_finite() && !(f == 0.0 && self.frequencies.is_empty()),
            None => false,
        }
    }

    /// Returns `true` if this candidate satisfies the target-fitness
    /// termination condition.
    pub fn meets_target(&self, target_fitness: f64) -> bool {
        match self.fitness {
            Some(f) => self.has_valid_fitness() && f <= target_fitness,
            None => false,
        }
    }
}

impl std::fmt::Display for Individual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.fitness {
            Some(fit) => write!(f, "fitness {:10.3}, {}", fit, self.params),
            None => write!(f, "fitness    ---.---, {}", self.params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_unevaluated_never_meets_target() {
        let ind = Individual::new(MaterialParams::new(2e11, 0.3), 0);
        assert!(!ind.meets_target(f64::INFINITY));
    }

    #[test]
    fn test_degenerate_zero_fitness_excluded() {
        let mut ind = Individual::new(MaterialParams::new(2e11, 0.3), 0);
        ind.fitness = Some(0.0);
        // Empty frequency vector: the zero came from a failed extraction.
        assert!(!ind.has_valid_fitness());
        assert!(!ind.meets_target(500.0));
    }

    #[test]
    fn test_legitimate_zero_fitness_accepted() {
        let mut ind = Individual::new(MaterialParams::new(2e11, 0.3), 0);
        ind.frequencies = array![100.0, 200.0];
        ind.fitness = Some(0.0);
        assert!(ind.has_valid_fitness());
        assert!(ind.meets_target(500.0));
    }

    #[test]
    fn test_meets_target_threshold() {
        let mut ind = Individual::new(MaterialParams::new(2e11, 0.3), 1);
        ind.frequencies = array![90.0, 210.0];
        ind.fitness = Some(10.0);
        assert!(ind.meets_target(10.0));
        assert!(!ind.meets_target(9.99));
    }
}
