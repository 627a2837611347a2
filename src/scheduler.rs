//! Batch evaluation of a population on a bounded worker pool.
//!
//! Each task owns exactly one individual for its lifetime: solver run, RMSE
//! scoring, then writing frequencies and fitness back onto that individual.
//! A task failure is captured as an [`EvalFailure`] keyed by the individual's
//! population index; it never cancels or blocks sibling evaluations. The
//! call joins every dispatched task before returning, so selection logic
//! always sees a terminal outcome per individual.

use log::{info, warn};
use ndarray::Array1;
use rayon::prelude::*;

use crate::error::{IdentError, Result};
use crate::fitness::rmse;
use crate::individual::Individual;
use crate::solver::SolverAdapter;

/// Number of worker threads used when none is configured. Each task runs one
/// expensive external process, so the pool stays small.
pub const DEFAULT_WORKERS: usize = 3;

/// A per-candidate evaluation failure, recorded instead of propagated.
#[derive(Debug)]
pub struct EvalFailure {
    /// Index of the individual in the dispatched batch.
    pub index: usize,
    /// The error that terminated the task.
    pub error: IdentError,
}

/// Evaluates every individual of a batch against the target vector.
///
/// Dispatches one task per individual to a pool bounded at `workers` threads.
/// The pool is built fresh for the batch and torn down when the call returns.
/// Completion order is unspecified; the only guarantee is that on return
/// every individual either carries an updated fitness or has a failure
/// recorded against it. A failed individual keeps its previous fitness. No
/// retry is attempted.
pub fn evaluate_population<S>(
    individuals: &mut [Individual],
    solver: &S,
    target: &Array1<f64>,
    workers: usize,
) -> Vec<EvalFailure>
where
    S: SolverAdapter + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build();

    let mut failures: Vec<EvalFailure> = match pool {
        Ok(pool) => pool.install(|| {
            individuals
                .par_iter_mut()
                .enumerate()
                .filter_map(|(index, ind)| dispatch_one(index, ind, solver, target))
                .collect()
        }),
        Err(e) => {
            // No pool, no parallelism; the batch still gets evaluated.
            warn!("worker pool unavailable ({e}), evaluating sequentially");
            individuals
                .iter_mut()
                .enumerate()
                .filter_map(|(index, ind)| dispatch_one(index, ind, solver, target))
                .collect()
        }
    };
    failures.sort_by_key(|f| f.index);
    failures
}

/// Runs one task and turns its outcome into an optional failure record.
fn dispatch_one<S>(
    index: usize,
    ind: &mut Individual,
    solver: &S,
    target: &Array1<f64>,
) -> Option<EvalFailure>
where
    S: SolverAdapter + ?Sized,
{
    match evaluate_one(ind, solver, target) {
        Ok(fitness) => {
            info!("candidate {index}: fitness {fitness:10.3} ({})", ind.params);
            None
        }
        Err(error) => {
            warn!("candidate {index}: {error} ({})", ind.params);
            Some(EvalFailure { index, error })
        }
    }
}

/// One evaluation task: solve, score, write back.
fn evaluate_one<S>(ind: &mut Individual, solver: &S, target: &Array1<f64>) -> Result<f64>
where
    S: SolverAdapter + ?Sized,
{
    let artifact = ind.artifact.clone().ok_or_else(|| IdentError::ArtifactWrite {
        path: Default::default(),
        reason: "candidate has no materialized artifact".into(),
    })?;
    let frequencies = solver.evaluate(&artifact)?;
    let fitness = rmse(&frequencies, target)?;
    ind.frequencies = frequencies;
    ind.fitness = Some(fitness);
    Ok(fitness)
}
