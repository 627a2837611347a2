//! Pressure-weighted refresh of the working pool.
//!
//! Before mutation, a full-size intermediate pool is rebuilt by repeatedly
//! sampling two distinct parents uniformly from the current population and
//! averaging their design vectors with fitness-proportional weights
//! (`w = fitness / pair sum` per parent). The pool keeps the population's
//! cardinality; this is a recombination pass, not an elitist cut.

use rand::Rng;

use crate::distinct_indices::distinct_indices;
use crate::individual::Individual;
use crate::material::MaterialParams;

/// Builds the size-`n` intermediate pool for one generation.
pub(crate) fn weighted_refresh<R: Rng + ?Sized>(
    population: &[Individual],
    generation: usize,
    rng: &mut R,
) -> Vec<Individual> {
    let n = population.len();
    (0..n)
        .map(|_| {
            let first = rng.random_range(0..n);
            let second = distinct_indices(first, 1, n, rng)[0];
            let params = weighted_pair(&population[first], &population[second]);
            Individual::new(params, generation)
        })
        .collect()
}

/// Fitness-weighted average of two parents' design vectors.
///
/// Falls back to equal weights when either parent has no usable fitness or
/// the pair sum is not a positive finite number.
pub(crate) fn weighted_pair(p1: &Individual, p2: &Individual) -> MaterialParams {
    let (w1, w2) = match (p1.fitness, p2.fitness) {
        (Some(f1), Some(f2)) if (f1 + f2).is_finite() && f1 + f2 > 0.0 => {
            let sum = f1 + f2;
            (f1 / sum, f2 / sum)
        }
        _ => (0.5, 0.5),
    };
    MaterialParams {
        elastic_modulus: w1 * p1.params.elastic_modulus + w2 * p2.params.elastic_modulus,
        poisson_ratio: w1 * p1.params.poisson_ratio + w2 * p2.params.poisson_ratio,
    }
}
