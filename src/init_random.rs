//! Random population initialization inside the parameter bounds.

use rand::Rng;

use crate::individual::Individual;
use crate::material::ParamBounds;

/// Builds `n` unevaluated candidates with uniformly random design vectors.
pub(crate) fn init_random<R: Rng + ?Sized>(
    n: usize,
    bounds: &ParamBounds,
    rng: &mut R,
) -> Vec<Individual> {
    (0..n)
        .map(|_| Individual::new(bounds.sample(rng), 0))
        .collect()
}
