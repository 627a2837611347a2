//! Material parameter identification from modal frequencies.
//!
//! This crate identifies the elastic modulus and Poisson ratio of a
//! structural model by differential evolution: candidate parameter pairs are
//! embedded into copies of a template solver deck, an external FEA solver
//! computes each candidate's modal frequencies, and candidates are scored by
//! RMSE against a measured target frequency set. Mutation, recombination and
//! greedy selection iterate until the target fitness is reached or the
//! generation budget runs out.
//!
//! Solver runs are expensive external processes, so every evaluation batch is
//! fanned out through a small bounded worker pool; a single candidate's
//! failed run is recorded and logged without aborting its siblings.
//!
//! # Example
//!
//! ```no_run
//! use modalfit::{IdentConfigBuilder, IdentEngine, NastranDeckWriter, NastranSolver};
//! use ndarray::array;
//!
//! let config = IdentConfigBuilder::new()
//!     .population_size(50)
//!     .max_generations(100)
//!     .mutation_factor(0.1)
//!     .crossover_rate(0.5)
//!     .target_fitness(500.0)
//!     .build()
//!     .expect("invalid config");
//!
//! let writer = NastranDeckWriter::new("models/nastran_modal.bdf");
//! let solver = NastranSolver::new("/opt/nastran/bin/nastran");
//! let target = array![1.617939e-2, 1.075608e4, 2.255294e4];
//!
//! let mut engine = IdentEngine::new(writer, solver, target, config).expect("setup failed");
//! let report = engine.run().expect("run failed");
//! println!("best: {} after {} generations", report.best, report.generations);
//! ```
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// Error taxonomy for configuration and per-candidate evaluation failures.
pub mod error;
pub use error::{IdentError, Result};

/// Design vector and parameter bounds.
pub mod material;
/// Candidate solution lifecycle.
pub mod individual;
/// RMSE fitness against the target frequency set.
pub mod fitness;
/// Solver input materialization (property writer).
pub mod deck;
/// External solver invocation and report parsing.
pub mod solver;
/// Bounded worker-pool batch evaluation.
pub mod scheduler;
/// The generational identification engine.
pub mod engine;

mod crossover_binomial;
mod distinct_indices;
mod init_random;
mod mutant_rand1;
mod weighted_refresh;


pub use deck::{NastranDeckWriter, PropertyWriter};
pub use engine::{IdentEngine, IdentReport};
pub use individual::Individual;
pub use material::{MaterialParams, ParamBounds};
pub use scheduler::{DEFAULT_WORKERS, EvalFailure};
pub use solver::{NastranSolver, SolverAdapter};

/// Configuration for one identification run.
///
/// Holds the DE hyperparameters, the parameter bounds and the termination
/// policy. Use [`IdentConfigBuilder`] for validated construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentConfig {
    /// Component-wise bounds for the design vector.
    pub bounds: ParamBounds,
    /// DE mutation factor F in [0, 2].
    pub mutation_factor: f64,
    /// Crossover probability CR in [0, 1].
    pub crossover_rate: f64,
    /// Population size N, fixed across the run.
    pub population_size: usize,
    /// Generation budget; 0 evaluates the initial population only.
    pub max_generations: usize,
    /// Fitness at or below which the run terminates successfully.
    pub target_fitness: f64,
    /// Worker-pool size for evaluation batches.
    pub workers: usize,
    /// Optional random seed for reproducibility.
    pub seed: Option<u64>,
    /// Print per-generation progress on stderr.
    pub disp: bool,
}

impl Default for IdentConfig {
    fn default() -> Self {
        Self {
            bounds: ParamBounds::default(),
            mutation_factor: 0.1,
            crossover_rate: 0.5,
            population_size: 50,
            max_generations: 100,
            target_fitness: 500.0,
            workers: DEFAULT_WORKERS,
            seed: None,
            disp: false,
        }
    }
}

impl IdentConfig {
    /// Validates hyperparameters and bounds.
    ///
    /// # Errors
    ///
    /// Returns the corresponding configuration error for a population smaller
    /// than 4, a mutation factor outside [0, 2], a crossover rate outside
    /// [0, 1], or invalid bound intervals.
    pub fn validate(&self) -> Result<()> {
        self.bounds.validate()?;
        if self.population_size < 4 {
            return Err(IdentError::PopulationTooSmall {
                pop_size: self.population_size,
            });
        }
        if !(0.0..=2.0).contains(&self.mutation_factor) {
            return Err(IdentError::InvalidMutationFactor {
                factor: self.mutation_factor,
            });
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(IdentError::InvalidCrossoverRate {
                rate: self.crossover_rate,
            });
        }
        Ok(())
    }
}

/// Fluent builder for [`IdentConfig`].
///
/// # Example
///
/// ```rust
/// use modalfit::IdentConfigBuilder;
///
/// let config = IdentConfigBuilder::new()
///     .population_size(50)
///     .mutation_factor(0.5)
///     .crossover_rate(0.9)
///     .seed(42)
///     .build()
///     .expect("valid config");
/// ```
#[derive(Debug, Default)]
pub struct IdentConfigBuilder {
    cfg: IdentConfig,
}

impl IdentConfigBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }
    /// Sets the design-vector bounds.
    pub fn bounds(mut self, v: ParamBounds) -> Self {
        self.cfg.bounds = v;
        self
    }
    /// Sets the mutation factor F.
    pub fn mutation_factor(mut self, v: f64) -> Self {
        self.cfg.mutation_factor = v;
        self
    }
    /// Sets the crossover rate CR.
    pub fn crossover_rate(mut self, v: f64) -> Self {
        self.cfg.crossover_rate = v;
        self
    }
    /// Sets the population size N.
    pub fn population_size(mut self, v: usize) -> Self {
        self.cfg.population_size = v;
        self
    }
    /// Sets the generation budget.
    pub fn max_generations(mut self, v: usize) -> Self {
        self.cfg.max_generations = v;
        self
    }
    /// Sets the target fitness threshold.
    pub fn target_fitness(mut self, v: f64) -> Self {
        self.cfg.target_fitness = v;
        self
    }
    /// Sets the worker-pool size.
    pub fn workers(mut self, v: usize) -> Self {
        self.cfg.workers = v;
        self
    }
    /// Sets the random seed for reproducibility.
    pub fn seed(mut self, v: u64) -> Self {
        self.cfg.seed = Some(v);
        self
    }
    /// Enables/disables progress display.
    pub fn disp(mut self, v: bool) -> Self {
        self.cfg.disp = v;
        self
    }
    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// See [`IdentConfig::validate`].
    pub fn build(self) -> Result<IdentConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}
