use clap::Parser;
use modalfit::{IdentConfig, IdentEngine, NastranDeckWriter, NastranSolver};
use ndarray::Array1;
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

/// Run description loaded from a TOML file: solver and template locations,
/// the measured target frequencies, and the DE configuration.
#[derive(Debug, Deserialize)]
struct RunFile {
    /// Template bulk-data deck whose MAT1 card gets rewritten per candidate.
    template: PathBuf,
    /// Path to the solver executable.
    solver: PathBuf,
    /// Measured modal frequencies the identification targets.
    target_frequencies: Vec<f64>,
    /// Optional cap on eigenmodes read from each solver report.
    eigenmodes: Option<usize>,
    /// DE hyperparameters and termination policy.
    #[serde(default)]
    config: IdentConfig,
}

#[derive(Parser, Debug)]
#[command(
    name = "modalfit",
    about = "Identify elastic modulus and Poisson ratio from measured modal frequencies"
)]
struct Cli {
    /// TOML run file (template, solver, target frequencies, DE config)
    #[arg(long)]
    run: PathBuf,

    /// Override the population size from the run file
    #[arg(long)]
    population: Option<usize>,

    /// Override the generation budget from the run file
    #[arg(long)]
    max_generations: Option<usize>,

    /// Override the target fitness threshold from the run file
    #[arg(long)]
    target_fitness: Option<f64>,

    /// Override the worker-pool size from the run file
    #[arg(long)]
    workers: Option<usize>,

    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Print per-generation progress on stderr
    #[arg(long, default_value_t = false)]
    disp: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("modalfit: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let body = fs::read_to_string(&cli.run)
        .map_err(|e| format!("cannot read run file {}: {e}", cli.run.display()))?;
    let run_file: RunFile = toml::from_str(&body)
        .map_err(|e| format!("cannot parse run file {}: {e}", cli.run.display()))?;

    let mut config = run_file.config;
    if let Some(v) = cli.population {
        config.population_size = v;
    }
    if let Some(v) = cli.max_generations {
        config.max_generations = v;
    }
    if let Some(v) = cli.target_fitness {
        config.target_fitness = v;
    }
    if let Some(v) = cli.workers {
        config.workers = v;
    }
    if let Some(v) = cli.seed {
        config.seed = Some(v);
    }
    if cli.disp {
        config.disp = true;
    }

    let writer = NastranDeckWriter::new(&run_file.template);
    let mut solver = NastranSolver::new(&run_file.solver);
    if let Some(modes) = run_file.eigenmodes {
        solver = solver.with_eigenmodes(modes);
    }
    let target = Array1::from_vec(run_file.target_frequencies);

    let mut engine = IdentEngine::new(writer, solver, target, config)?;
    let report = engine.run()?;

    println!(
        "{}: {}",
        if report.success { "converged" } else { "budget exhausted" },
        report.message
    );
    println!("best candidate: {}", report.best);
    println!(
        "generations: {}, solver runs: {}, elapsed: {:.1?}",
        report.generations, report.nfev, report.elapsed
    );
    Ok(())
}
