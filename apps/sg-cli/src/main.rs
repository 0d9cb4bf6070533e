use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use sg_sim::{load_yaml, run_case, RunRecord, SimError, SimResult};

#[derive(Parser)]
#[command(name = "sg-cli")]
#[command(about = "SGSFlow CLI - dynamic Smagorinsky closure on prescribed flows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate case file syntax and settings
    Validate {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
    /// Run the closure for a case
    Run {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Override the number of steps
        #[arg(long)]
        steps: Option<usize>,
        /// Print the run record as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Collect and log per-phase timings
        #[arg(long)]
        timing: bool,
    },
}

fn main() -> SimResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Run {
            case_path,
            steps,
            json,
            timing,
        } => cmd_run(&case_path, steps, json, timing),
    }
}

fn cmd_validate(case_path: &Path) -> SimResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = load_yaml(case_path)?;
    println!("✓ Case '{}' is valid", case.name);
    println!(
        "  mesh: {:?} cells, filter: {}, steps: {}",
        case.mesh.cells,
        case.les.filter.kind(),
        case.time.steps
    );
    Ok(())
}

fn cmd_run(case_path: &Path, steps: Option<usize>, json: bool, timing: bool) -> SimResult<()> {
    let mut case = load_yaml(case_path)?;
    if let Some(steps) = steps {
        if steps == 0 {
            return Err(SimError::InvalidArg {
                what: "--steps must be positive",
            });
        }
        case.time.steps = steps;
    }
    if timing {
        sg_core::timing::enable_timing();
    }

    let start = Instant::now();
    let record = run_case(&case)?;
    let elapsed = start.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
        println!("✓ Completed in {:.3} s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn print_record(record: &RunRecord) {
    println!("Case: {} ({} cells)", record.case, record.n_cells);
    println!(
        "{:>6} {:>10} {:>12} {:>12} {:>12} {:>12} {:>12} {:>6}",
        "step", "time", "k_mean", "k_max", "nut_max", "cD_max", "Ce_max", "iters"
    );
    for s in &record.steps {
        println!(
            "{:>6} {:>10.4} {:>12.4e} {:>12.4e} {:>12.4e} {:>12.4e} {:>12.4e} {:>6}{}",
            s.step,
            s.time,
            s.k_mean,
            s.k_max,
            s.nut_max,
            s.cd_max,
            s.ce_max,
            s.solver_iterations,
            if s.converged { "" } else { " (not converged)" }
        );
    }
}
