//! External solver invocation and report parsing.
//!
//! The solver is run as a blocking subprocess against one candidate deck. It
//! writes an `.f06` report next to the deck as a side effect; the predicted
//! modal frequencies are the second column of the first eigen-analysis table
//! in that report.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use ndarray::Array1;

use crate::error::{IdentError, Result};

/// Marker line that opens the eigen-analysis results table.
const TABLE_MARKER: &str = "MODAL EFFECTIVE MASS FRACTION";
/// Header rows between the marker and the first data row.
const HEADER_LINES: usize = 5;

/// Computes a candidate's predicted modal frequencies.
///
/// The real implementation shells out to the FEA solver; tests inject fakes
/// so the engine's logic runs without any external process.
pub trait SolverAdapter: Send + Sync {
    /// Runs the solver to completion on `artifact` and returns the predicted
    /// frequencies in report order.
    fn evaluate(&self, artifact: &Path) -> Result<Array1<f64>>;
}

/// Invokes a Nastran executable and parses its `.f06` report.
#[derive(Debug, Clone)]
pub struct NastranSolver {
    executable: PathBuf,
    /// Cap on the number of eigenmodes read from the report, if any.
    eigenmodes: Option<usize>,
}

impl NastranSolver {
    /// Creates an adapter for the given solver executable, reading every mode
    /// the report contains.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            eigenmodes: None,
        }
    }

    /// Limits extraction to the first `count` eigenmodes.
    pub fn with_eigenmodes(mut self, count: usize) -> Self {
        self.eigenmodes = Some(count);
        self
    }

    fn exec_error(&self, artifact: &Path, reason: impl ToString) -> IdentError {
        IdentError::SolverExecution {
            artifact: artifact.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

impl SolverAdapter for NastranSolver {
    fn evaluate(&self, artifact: &Path) -> Result<Array1<f64>> {
        let out_dir = artifact.parent().unwrap_or_else(|| Path::new("."));
        let output = Command::new(&self.executable)
            .arg(artifact)
            .arg(format!("out={}", out_dir.display()))
            .arg("old=No")
            .output()
            .map_err(|e| self.exec_error(artifact, e))?;
        if !output.status.success() {
            return Err(self.exec_error(artifact, format!("solver exited with {}", output.status)));
        }

        let report = artifact.with_extension("f06");
        let body = fs::read_to_string(&report)
            .map_err(|_| self.exec_error(artifact, "solver produced no report"))?;

        let mut freqs = parse_frequency_table(&body).map_err(|reason| IdentError::ResultParse {
            report: report.clone(),
            reason,
        })?;
        if let Some(n) = self.eigenmodes {
            freqs.truncate(n);
        }
        Ok(Array1::from_vec(freqs))
    }
}

/// Extracts the frequency column from the first eigen-analysis table.
///
/// Skips a fixed-size header region after the marker line, then reads the
/// second column of each row until a blank-line terminator.
pub(crate) fn parse_frequency_table(body: &str) -> std::result::Result<Vec<f64>, String> {
    let mut lines = body.lines();
    if !lines.by_ref().any(|l| l.contains(TABLE_MARKER)) {
        return Err(format!("no '{}' table in report", TABLE_MARKER));
    }
    let mut lines = lines.skip(HEADER_LINES);

    let mut frequencies = Vec::new();
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
        let value = line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| format!("malformed table row: {:?}", line))?;
        let freq: f64 = value
            .parse()
            .map_err(|_| format!("malformed frequency value: {:?}", value))?;
        frequencies.push(freq);
    }
    Ok(frequencies)
}
