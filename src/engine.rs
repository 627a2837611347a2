//! The generational identification loop.
//!
//! One coordinating thread owns the state machine; every evaluation batch is
//! fanned out through [`crate::scheduler`] and joined before selection runs.
//! Candidate-level failures are recorded and logged, never fatal: a
//! generation where every solver run fails simply leaves the population
//! unreplaced and burns one unit of the generation budget.

use std::time::{Duration, Instant};

use log::warn;
use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::IdentConfig;
use crate::crossover_binomial::binomial_crossover;
use crate::deck::PropertyWriter;
use crate::error::{IdentError, Result};
use crate::individual::Individual;
use crate::init_random::init_random;
use crate::mutant_rand1::mutant_rand1;
use crate::scheduler::evaluate_population;
use crate::solver::SolverAdapter;
use crate::weighted_refresh::weighted_refresh;

/// Result of an identification run.
#[derive(Debug, Clone)]
pub struct IdentReport {
    /// The best individual of the final population.
    pub best: Individual,
    /// Whether the target fitness was reached.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
    /// Number of generations performed (0 = initial population only).
    pub generations: usize,
    /// Number of solver evaluations dispatched.
    pub nfev: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Final population, in slot order.
    pub population: Vec<Individual>,
}

/// Differential-evolution engine for material parameter identification.
///
/// Owns the population across generations; the property writer and solver
/// adapter are injected so the loop runs identically against the real
/// external solver or against fakes in tests.
pub struct IdentEngine<W, S> {
    writer: W,
    solver: S,
    target: Array1<f64>,
    config: IdentConfig,
}

impl<W, S> IdentEngine<W, S>
where
    W: PropertyWriter,
    S: SolverAdapter,
{
    /// Creates an engine for one run against `target`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config is invalid or the target
    /// vector is empty.
    pub fn new(writer: W, solver: S, target: Array1<f64>, config: IdentConfig) -> Result<Self> {
        config.validate()?;
        if target.is_empty() {
            return Err(IdentError::EmptyTarget);
        }
        Ok(Self {
            writer,
            solver,
            target,
            config,
        })
    }

    /// Runs the identification to termination and reports the best candidate.
    ///
    /// # Errors
    ///
    /// Only run-level setup failures propagate (clearing the artifact
    /// workspace). Per-candidate evaluation failures are recorded and logged.
    pub fn run(&mut self) -> Result<IdentReport> {
        let start = Instant::now();
        let cfg = &self.config;
        let n = cfg.population_size;

        // Stale artifacts from an earlier run must not be picked up.
        self.writer.reset()?;

        let mut rng: StdRng = match cfg.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => {
                let mut thread_rng = rand::rng();
                StdRng::from_rng(&mut thread_rng)
            }
        };

        if cfg.disp {
            eprintln!(
                "ident init: population={}, max_generations={}, F={:.2}, CR={:.2}, target_fitness={:.3e}",
                n, cfg.max_generations, cfg.mutation_factor, cfg.crossover_rate, cfg.target_fitness
            );
        }

        let mut population = init_random(n, &cfg.bounds, &mut rng);
        materialize_batch(&self.writer, &mut population);

        let mut nfev = dispatched(&population);
        let failures = evaluate_population(&mut population, &self.solver, &self.target, cfg.workers);
        let mut generation = 0usize;
        self.report_generation(generation, &population, failures.len());

        let mut success = false;
        let mut message = String::new();

        if let Some(best) = target_reached(&population, cfg.target_fitness) {
            success = true;
            message = format!("Target fitness reached: {:.6e}", best);
        } else {
            while generation < cfg.max_generations {
                generation += 1;

                // Pressure-weighted refresh of the working pool, then rand/1
                // mutation and binomial crossover per slot.
                let pool = weighted_refresh(&population, generation, &mut rng);
                let mut trials: Vec<Individual> = (0..n)
                    .map(|i| {
                        let mutant =
                            mutant_rand1(i, &pool, cfg.mutation_factor, &cfg.bounds, &mut rng);
                        let params = binomial_crossover(
                            &pool[i].params,
                            &mutant,
                            cfg.crossover_rate,
                            &mut rng,
                        );
                        Individual::new(params, generation)
                    })
                    .collect();
                materialize_batch(&self.writer, &mut trials);

                nfev += dispatched(&trials);
                let failures =
                    evaluate_population(&mut trials, &self.solver, &self.target, cfg.workers);

                greedy_select(&mut population, trials);
                self.report_generation(generation, &population, failures.len());

                if let Some(best) = target_reached(&population, cfg.target_fitness) {
                    success = true;
                    message = format!("Target fitness reached: {:.6e}", best);
                    break;
                }
            }
        }

        if !success {
            message = format!("Generation budget exhausted: {}", cfg.max_generations);
        }

        let best = best_individual(&population).clone();
        let elapsed = start.elapsed();
        if cfg.disp {
            eprintln!("ident finished in {:.1?}: {} ({})", elapsed, message, best);
        }

        Ok(IdentReport {
            best,
            success,
            message,
            generations: generation,
            nfev,
            elapsed,
            population,
        })
    }

    fn report_generation(&self, generation: usize, population: &[Individual], failures: usize) {
        if !self.config.disp {
            return;
        }
        let best = best_individual(population);
        eprintln!(
            "ident gen {:4}  best: {}  failures={}/{}",
            generation,
            best,
            failures,
            population.len()
        );
    }
}

/// Materializes every candidate's artifact before dispatch. A write failure
/// leaves the candidate without an artifact; the scheduler records it as a
/// failed evaluation for this generation.
fn materialize_batch<W: PropertyWriter>(writer: &W, batch: &mut [Individual]) {
    for (i, ind) in batch.iter_mut().enumerate() {
        match writer.materialize(&ind.params) {
            Ok(path) => ind.artifact = Some(path),
            Err(e) => {
                ind.artifact = None;
                warn!("candidate {i}: {e}");
            }
        }
    }
}

/// Candidates that reach the solver. A candidate whose materialization failed
/// has no artifact and is never dispatched.
fn dispatched(batch: &[Individual]) -> usize {
    batch.iter().filter(|ind| ind.artifact.is_some()).count()
}

/// Greedy replacement: the trial takes slot `i` iff its fitness is usable and
/// strictly better than the incumbent's. Ties and failed trials never
/// replace; an incumbent without a usable fitness loses to any valid trial.
fn greedy_select(population: &mut [Individual], trials: Vec<Individual>) {
    for (incumbent, trial) in population.iter_mut().zip(trials) {
        if !trial.has_valid_fitness() {
            continue;
        }
        let replace = match (incumbent.has_valid_fitness(), incumbent.fitness, trial.fitness) {
            (true, Some(old), Some(new)) => new < old,
            _ => true,
        };
        if replace {
            *incumbent = trial;
        }
    }
}

/// Returns the fitness of a target-satisfying individual, if any. The
/// degenerate-fitness guard lives in [`Individual::meets_target`].
fn target_reached(population: &[Individual], target_fitness: f64) -> Option<f64> {
    population
        .iter()
        .filter(|ind| ind.meets_target(target_fitness))
        .filter_map(|ind| ind.fitness)
        .min_by(|a, b| a.total_cmp(b))
}

/// Best individual by fitness; candidates without a usable fitness rank last.
fn best_individual(population: &[Individual]) -> &Individual {
    population
        .iter()
        .min_by(|a, b| {
            let fa = a.fitness.filter(|_| a.has_valid_fitness());
            let fb = b.fitness.filter(|_| b.has_valid_fitness());
            match (fa, fb) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        })
        .expect("population is never empty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialParams;
    use ndarray::array;

    fn candidate(fitness: Option<f64>, freqs: Array1<f64>) -> Individual {
        let mut ind = Individual::new(MaterialParams::new(2e11, 0.3), 0);
        ind.frequencies = freqs;
        ind.fitness = fitness;
        ind
    }

    #[test]
    fn test_greedy_select_strict_improvement_only() {
        let mut population = vec![
            candidate(Some(10.0), array![1.0]),
            candidate(Some(10.0), array![1.0]),
            candidate(Some(10.0), array![1.0]),
        ];
        let trials = vec![
            candidate(Some(5.0), array![1.0]),  // better, replaces
            candidate(Some(10.0), array![1.0]), // tie, stays
            candidate(Some(15.0), array![1.0]), // worse, stays
        ];
        greedy_select(&mut population, trials);
        assert_eq!(population[0].fitness, Some(5.0));
        assert_eq!(population[1].fitness, Some(10.0));
        assert_eq!(population[2].fitness, Some(10.0));
    }

    #[test]
    fn test_greedy_select_failed_trial_never_replaces() {
        let mut population = vec![candidate(Some(10.0), array![1.0])];
        let trials = vec![candidate(None, Array1::zeros(0))];
        greedy_select(&mut population, trials);
        assert_eq!(population[0].fitness, Some(10.0));
    }

    #[test]
    fn test_greedy_select_valid_trial_beats_failed_incumbent() {
        let mut population = vec![candidate(None, Array1::zeros(0))];
        let trials = vec![candidate(Some(42.0), array![1.0])];
        greedy_select(&mut population, trials);
        assert_eq!(population[0].fitness, Some(42.0));
    }

    #[test]
    fn test_target_reached_ignores_degenerate_zero() {
        let population = vec![
            candidate(Some(0.0), Array1::zeros(0)), // failed extraction
            candidate(Some(800.0), array![1.0]),
        ];
        assert_eq!(target_reached(&population, 500.0), None);

        let population = vec![candidate(Some(0.0), array![100.0, 200.0])];
        assert_eq!(target_reached(&population, 500.0), Some(0.0));
    }

    #[test]
    fn test_best_individual_prefers_valid_fitness() {
        let population = vec![
            candidate(None, Array1::zeros(0)),
            candidate(Some(30.0), array![1.0]),
            candidate(Some(20.0), array![1.0]),
        ];
        assert_eq!(best_individual(&population).fitness, Some(20.0));
    }
}
