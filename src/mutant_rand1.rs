//! Rand/1 mutation on the design vector.

use rand::Rng;

use crate::distinct_indices::distinct_indices;
use crate::individual::Individual;
use crate::material::{MaterialParams, ParamBounds};

/// Builds the mutant for slot `i`: picks three distinct pool members a, b, c
/// (all different from `i`) and combines them per component as
/// `a + F * (b - c)`, clipped into the bounds.
pub(crate) fn mutant_rand1<R: Rng + ?Sized>(
    i: usize,
    pool: &[Individual],
    f: f64,
    bounds: &ParamBounds,
    rng: &mut R,
) -> MaterialParams {
    let idxs = distinct_indices(i, 3, pool.len(), rng);
    let a = &pool[idxs[0]].params;
    let b = &pool[idxs[1]].params;
    let c = &pool[idxs[2]].params;
    bounds.clip(de_combine(a, b, c, f))
}

/// The raw rand/1 arithmetic, before bounds clipping.
pub(crate) fn de_combine(
    a: &MaterialParams,
    b: &MaterialParams,
    c: &MaterialParams,
    f: f64,
) -> MaterialParams {
    MaterialParams {
        elastic_modulus: a.elastic_modulus + f * (b.elastic_modulus - c.elastic_modulus),
        poisson_ratio: a.poisson_ratio + f * (b.poisson_ratio - c.poisson_ratio),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_de_combine_arithmetic() {
        let a = MaterialParams::new(1e11, 0.2);
        let b = MaterialParams::new(2e11, 0.3);
        let c = MaterialParams::new(1.5e11, 0.25);
        let mutant = de_combine(&a, &b, &c, 0.5);
        assert_eq!(mutant.elastic_modulus, 1.25e11);
        assert!((mutant.poisson_ratio - 0.225).abs() < 1e-12);
    }

    #[test]
    fn test_mutant_clipped_into_bounds() {
        let bounds = ParamBounds::default();
        let mut rng = StdRng::seed_from_u64(9);
        // Parents near opposite corners force out-of-range mutants.
        let pool: Vec<Individual> = [
            MaterialParams::new(bounds.e_max, bounds.v_max),
            MaterialParams::new(bounds.e_min, 0.0),
            MaterialParams::new(bounds.e_max, bounds.v_max),
            MaterialParams::new(bounds.e_min, 0.0),
            MaterialParams::new(bounds.e_max, 0.0),
        ]
        .into_iter()
        .map(|p| Individual::new(p, 0))
        .collect();

        for i in 0..pool.len() {
            for _ in 0..50 {
                let mutant = mutant_rand1(i, &pool, 1.8, &bounds, &mut rng);
                assert!(bounds.contains(&mutant), "mutant escaped bounds: {:?}", mutant);
            }
        }
    }
}
