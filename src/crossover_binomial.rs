//! Binomial crossover between a refreshed target and its mutant.
//!
//! Each design-vector component is taken from the mutant with independent
//! probability CR, otherwise from the target. There is no forced mutant
//! component: CR = 0 reproduces the target exactly and CR = 1 the mutant,
//! which keeps both extremes deterministic under a seeded source.

use rand::Rng;

use crate::material::MaterialParams;

pub(crate) fn binomial_crossover<R: Rng + ?Sized>(
    target: &MaterialParams,
    mutant: &MaterialParams,
    cr: f64,
    rng: &mut R,
) -> MaterialParams {
    MaterialParams {
        elastic_modulus: if rng.random::<f64>() < cr {
            mutant.elastic_modulus
        } else {
            target.elastic_modulus
        },
        poisson_ratio: if rng.random::<f64>() < cr {
            mutant.poisson_ratio
        } else {
            target.poisson_ratio
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_cr_one_takes_all_mutant_components() {
        let target = MaterialParams::new(1e11, 0.2);
        let mutant = MaterialParams::new(2e11, 0.4);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..20 {
            let trial = binomial_crossover(&target, &mutant, 1.0, &mut rng);
            assert_eq!(trial, mutant);
        }
    }

    #[test]
    fn test_cr_zero_takes_all_target_components() {
        let target = MaterialParams::new(1e11, 0.2);
        let mutant = MaterialParams::new(2e11, 0.4);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..20 {
            let trial = binomial_crossover(&target, &mutant, 0.0, &mut rng);
            assert_eq!(trial, target);
        }
    }

    #[test]
    fn test_components_mix_independently() {
        let target = MaterialParams::new(1e11, 0.2);
        let mutant = MaterialParams::new(2e11, 0.4);
        let mut rng = StdRng::seed_from_u64(42);
        let mut mixed = false;
        for _ in 0..200 {
            let trial = binomial_crossover(&target, &mutant, 0.5, &mut rng);
            let from_mutant_e = trial.elastic_modulus == mutant.elastic_modulus;
            let from_mutant_v = trial.poisson_ratio == mutant.poisson_ratio;
            if from_mutant_e != from_mutant_v {
                mixed = true;
            }
        }
        assert!(mixed, "components should be inherited independently");
    }
}
