//! Error types for the identification run.
//!
//! Evaluation errors (`ArtifactWrite`, `SolverExecution`, `ResultParse`,
//! `DimensionMismatch`) are per-candidate: the scheduler records them against
//! the individual that produced them and the generation loop carries on.
//! Configuration errors are raised once, when a run is being set up.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring or running an identification.
#[derive(Debug, Error)]
pub enum IdentError {
    /// The property writer could not produce a solver input artifact.
    #[error("cannot write solver input {path}: {reason}")]
    ArtifactWrite {
        /// Path of the artifact that could not be written
        path: PathBuf,
        /// Underlying cause (missing MAT1 card, I/O failure, ...)
        reason: String,
    },

    /// The external solver process failed or produced no report.
    #[error("solver run failed for {artifact}: {reason}")]
    SolverExecution {
        /// Input artifact the solver was invoked on
        artifact: PathBuf,
        /// Underlying cause (spawn error, nonzero exit, missing report)
        reason: String,
    },

    /// The solver report exists but the frequency table is absent or malformed.
    #[error("cannot parse solver report {report}: {reason}")]
    ResultParse {
        /// Path of the report file
        report: PathBuf,
        /// What went wrong while reading the table
        reason: String,
    },

    /// Predicted frequency vector length does not match the target vector.
    #[error("frequency count mismatch: solver returned {got}, target has {expected}")]
    DimensionMismatch {
        /// Number of target frequencies
        expected: usize,
        /// Number of frequencies the solver produced
        got: usize,
    },

    /// A parameter bound interval is empty or non-finite.
    #[error("invalid bounds: {reason}")]
    InvalidBounds {
        /// Description of the offending interval
        reason: String,
    },

    /// Population size is too small for rand/1 mutation (needs >= 4).
    #[error("population size ({pop_size}) must be >= 4")]
    PopulationTooSmall {
        /// The invalid population size
        pop_size: usize,
    },

    /// Mutation factor is out of valid range [0, 2].
    #[error("invalid mutation factor: {factor} (must be in [0, 2])")]
    InvalidMutationFactor {
        /// The invalid mutation factor
        factor: f64,
    },

    /// Crossover rate is out of valid range [0, 1].
    #[error("invalid crossover rate: {rate} (must be in [0, 1])")]
    InvalidCrossoverRate {
        /// The invalid crossover rate
        rate: f64,
    },

    /// The target frequency vector is empty.
    #[error("target frequency vector is empty")]
    EmptyTarget,
}

/// A specialized `Result` type for identification operations.
pub type Result<T> = std::result::Result<T, IdentError>;

impl IdentError {
    /// Returns `true` for errors that are recovered per candidate by the
    /// scheduler rather than aborting the run.
    pub fn is_candidate_error(&self) -> bool {
        matches!(
            self,
            IdentError::ArtifactWrite { .. }
                | IdentError::SolverExecution { .. }
                | IdentError::ResultParse { .. }
                | IdentError::DimensionMismatch { .. }
        )
    }

    /// Returns `true` if this is a configuration-related error.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            IdentError::InvalidBounds { .. }
                | IdentError::PopulationTooSmall { .. }
                | IdentError::InvalidMutationFactor { .. }
                | IdentError::InvalidCrossoverRate { .. }
                | IdentError::EmptyTarget
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IdentError::DimensionMismatch {
            expected: 20,
            got: 6,
        };
        assert_eq!(
            err.to_string(),
            "frequency count mismatch: solver returned 6, target has 20"
        );
    }

    #[test]
    fn test_is_candidate_error() {
        let solver_err = IdentError::SolverExecution {
            artifact: PathBuf::from("model.bdf"),
            reason: "exit status 1".into(),
        };
        let config_err = IdentError::PopulationTooSmall { pop_size: 2 };

        assert!(solver_err.is_candidate_error());
        assert!(!config_err.is_candidate_error());
    }

    #[test]
    fn test_is_config_error() {
        let config_err = IdentError::InvalidCrossoverRate { rate: 1.5 };
        let parse_err = IdentError::ResultParse {
            report: PathBuf::from("model.f06"),
            reason: "frequency table not found".into(),
        };

        assert!(config_err.is_config_error());
        assert!(!parse_err.is_config_error());
    }
}
