//! Solver input materialization.
//!
//! A candidate's parameters are embedded into a copy of a template Nastran
//! bulk-data deck by rewriting the E and NU fields of its first MAT1 card.
//! MAT1 is a small-field card: nine 8-column fields
//! `MAT1 | MID | E | G | NU | RHO | A | TREF | GE`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IdentError, Result};
use crate::material::MaterialParams;

/// Materializes a design vector into a solver input artifact.
///
/// Implementations own a filesystem namespace (or a fake); the engine only
/// sees opaque path handles.
pub trait PropertyWriter: Send + Sync {
    /// Writes a new input artifact with `params` embedded and returns its
    /// path. The template is never mutated.
    fn materialize(&self, params: &MaterialParams) -> Result<PathBuf>;

    /// Clears stale artifacts from a previous run. Called once before the
    /// initial population is materialized.
    fn reset(&self) -> Result<()> {
        Ok(())
    }
}

/// Writes candidate decks derived from a template `.bdf` file.
///
/// Artifacts land in a `candidates/` subdirectory next to the template, named
/// deterministically from the parameter values so concurrent writers never
/// collide.
#[derive(Debug, Clone)]
pub struct NastranDeckWriter {
    template: PathBuf,
    workdir: PathBuf,
}

const FIELD_WIDTH: usize = 8;
const E_FIELD: usize = 2;
const NU_FIELD: usize = 4;

impl NastranDeckWriter {
    /// Creates a writer for the given template deck.
    pub fn new(template: impl Into<PathBuf>) -> Self {
        let template = template.into();
        let workdir = template
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("candidates");
        Self { template, workdir }
    }

    /// Directory the candidate decks are written into.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn write_error(&self, path: &Path, reason: impl ToString) -> IdentError {
        IdentError::ArtifactWrite {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    fn artifact_path(&self, params: &MaterialParams) -> PathBuf {
        let stem = self
            .template
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model");
        self.workdir.join(format!(
            "{}_{}_{:.6}.bdf",
            stem,
            format_nastran_real(params.elastic_modulus),
            params.poisson_ratio
        ))
    }
}

impl PropertyWriter for NastranDeckWriter {
    fn materialize(&self, params: &MaterialParams) -> Result<PathBuf> {
        let deck = fs::read_to_string(&self.template)
            .map_err(|e| self.write_error(&self.template, e))?;

        let mut lines: Vec<String> = deck.lines().map(str::to_owned).collect();
        let mat1 = lines
            .iter_mut()
            .find(|l| l.starts_with("MAT1"))
            .ok_or_else(|| self.write_error(&self.template, "template has no MAT1 card"))?;
        *mat1 = edit_mat1_line(mat1, params);

        let out = self.artifact_path(params);
        fs::create_dir_all(&self.workdir).map_err(|e| self.write_error(&self.workdir, e))?;
        let mut body = lines.join("\n");
        body.push('\n');
        fs::write(&out, body).map_err(|e| self.write_error(&out, e))?;
        Ok(out)
    }

    fn reset(&self) -> Result<()> {
        if self.workdir.exists() {
            fs::remove_dir_all(&self.workdir).map_err(|e| self.write_error(&self.workdir, e))?;
        }
        fs::create_dir_all(&self.workdir).map_err(|e| self.write_error(&self.workdir, e))?;
        Ok(())
    }
}

/// Rewrites the E and NU fields of a small-field MAT1 line, preserving the
/// remaining fields.
pub(crate) fn edit_mat1_line(line: &str, params: &MaterialParams) -> String {
    // Pad to the full nine fields so slicing is always in range.
    let padded = format!("{:<width$}", line, width = 9 * FIELD_WIDTH);
    let field = |i: usize| {
        padded
            .get(i * FIELD_WIDTH..(i + 1) * FIELD_WIDTH)
            .unwrap_or("        ")
    };

    let mut out = String::with_capacity(9 * FIELD_WIDTH);
    for i in 0..9 {
        match i {
            E_FIELD => out.push_str(&format!(
                "{:<width$}",
                format_nastran_real(params.elastic_modulus),
                width = FIELD_WIDTH
            )),
            NU_FIELD => out.push_str(&format!(
                "{:<width$}",
                format!("{:.6}", params.poisson_ratio),
                width = FIELD_WIDTH
            )),
            _ => out.push_str(field(i)),
        }
    }
    out
}

/// Formats a value in Nastran shorthand real notation, e.g. `2.000+11` for
/// 2e11. The exponent sign replaces the `e` so the value fits an 8-column
/// field.
pub(crate) fn format_nastran_real(v: f64) -> String {
    if v == 0.0 {
        return "0.000+0".to_string();
    }
    let mut exp = v.abs().log10().floor() as i32;
    let mut mantissa = format!("{:.3}", v / 10f64.powi(exp));
    // Rounding can carry the mantissa into the next decade; renormalize so
    // the field never grows past its 8-column slot.
    if mantissa == "10.000" || mantissa == "-10.000" {
        exp += 1;
        mantissa = format!("{:.3}", v / 10f64.powi(exp));
    }
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}{}{}", mantissa, sign, exp.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialParams;
    use std::fs;

    const MAT1_LINE: &str = "MAT1    1       2.000+11        0.3000007850.0001.200-0522.00000";

    #[test]
    fn test_format_nastran_real() {
        assert_eq!(format_nastran_real(2e11), "2.000+11");
        assert_eq!(format_nastran_real(1.25e11), "1.250+11");
        assert_eq!(format_nastran_real(7850.0), "7.850+3");
        assert_eq!(format_nastran_real(1.2e-5), "1.200-5");
        assert_eq!(format_nastran_real(0.0), "0.000+0");
    }

    #[test]
    fn test_format_nastran_real_decade_boundary() {
        // Mantissa rounding must carry into the exponent, never widen the field.
        assert_eq!(format_nastran_real(9.9999e10), "1.000+11");
        assert_eq!(format_nastran_real(9.99999), "1.000+1");
        assert_eq!(format_nastran_real(9.9999e-5), "1.000-4");
        assert_eq!(format_nastran_real(1e11), "1.000+11");
        for v in [9.9995e10, 9.9996e10, 2.99999e11] {
            assert!(
                format_nastran_real(v).len() <= FIELD_WIDTH,
                "field overflow for {v}: {:?}",
                format_nastran_real(v)
            );
        }
    }

    #[test]
    fn test_edit_mat1_line_alignment_at_decade_boundary() {
        let edited = edit_mat1_line(MAT1_LINE, &MaterialParams::new(9.9999e10, 0.3));
        assert_eq!(&edited[16..24], "1.000+11");
        assert_eq!(&edited[40..48], "7850.000");
        assert_eq!(&edited[48..56], "1.200-05");
    }

    #[test]
    fn test_edit_mat1_line_replaces_e_and_nu() {
        let edited = edit_mat1_line(MAT1_LINE, &MaterialParams::new(2.1e11, 0.25));
        assert_eq!(
            edited,
            "MAT1    1       2.100+11        0.2500007850.0001.200-0522.00000        "
        );
    }

    #[test]
    fn test_edit_mat1_line_preserves_other_fields() {
        let edited = edit_mat1_line(MAT1_LINE, &MaterialParams::new(9e9, 0.1));
        assert_eq!(&edited[40..48], "7850.000");
        assert_eq!(&edited[48..56], "1.200-05");
        assert_eq!(&edited[56..64], "22.00000");
    }

    #[test]
    fn test_materialize_writes_candidate_deck() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("modal.bdf");
        fs::write(&template, format!("SOL 103\nBEGIN BULK\n{}\nENDDATA\n", MAT1_LINE)).unwrap();

        let writer = NastranDeckWriter::new(&template);
        let params = MaterialParams::new(1.5e11, 0.33);
        let artifact = writer.materialize(&params).unwrap();

        assert!(artifact.starts_with(writer.workdir()));
        let body = fs::read_to_string(&artifact).unwrap();
        assert!(body.contains("1.500+11"));
        assert!(body.contains("0.330000"));
        // Template untouched.
        let original = fs::read_to_string(&template).unwrap();
        assert!(original.contains("2.000+11"));
    }

    #[test]
    fn test_materialize_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("modal.bdf");
        fs::write(&template, format!("{}\n", MAT1_LINE)).unwrap();

        let writer = NastranDeckWriter::new(&template);
        let params = MaterialParams::new(2e11, 0.3);
        let a = writer.materialize(&params).unwrap();
        let b = writer.materialize(&params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_materialize_without_mat1_card_fails() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("static.bdf");
        fs::write(&template, "SOL 101\nBEGIN BULK\nENDDATA\n").unwrap();

        let writer = NastranDeckWriter::new(&template);
        let err = writer.materialize(&MaterialParams::new(2e11, 0.3)).unwrap_err();
        assert!(matches!(err, crate::error::IdentError::ArtifactWrite { .. }));
    }

    #[test]
    fn test_reset_clears_stale_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("modal.bdf");
        fs::write(&template, format!("{}\n", MAT1_LINE)).unwrap();

        let writer = NastranDeckWriter::new(&template);
        let artifact = writer.materialize(&MaterialParams::new(2e11, 0.3)).unwrap();
        assert!(artifact.exists());

        writer.reset().unwrap();
        assert!(!artifact.exists());
        assert!(writer.workdir().exists());
    }
}
