//! Command-line driver for the flowmap pipeline.
//!
//! Runs the full pipeline for one of the bundled systems and prints the
//! one-step test metrics.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use flowmap_core::VectorField;
use flowmap_pipeline::{Config, Directory, Experiment, Report, Settings, presets};
use flowmap_solvers::transient::Solver;
use flowmap_systems::{Lorenz, Population};

#[derive(Parser, Debug)]
#[command(
    name = "flowmap",
    version,
    about = "Learn the one-step flow map of an ODE system and roll it out"
)]
struct Args {
    #[command(subcommand)]
    system: System,

    /// TOML file of settings applied over the system's preset
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for sampling, splitting and training
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Number of trajectories to sample
    #[arg(long, global = true)]
    trajectories: Option<usize>,

    /// Number of training epochs
    #[arg(long, global = true)]
    epochs: Option<usize>,

    /// Directory the dataset and model are cached in
    #[arg(long, global = true)]
    store: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum System {
    /// The Lorenz system (sigma = 10, rho = 28, beta = 8/3)
    Lorenz,

    /// The two-variable population system, cached in ./flowmap-population by default
    Population,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.system {
        System::Lorenz => run(Lorenz::default(), presets::lorenz(), &args, None),
        System::Population => run(
            Population::default(),
            presets::population(),
            &args,
            Some(PathBuf::from("flowmap-population")),
        ),
    }
}

fn settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    settings.seed = args.seed.or(settings.seed);
    settings.trajectories = args.trajectories.or(settings.trajectories);
    settings.train.epochs = args.epochs.or(settings.train.epochs);

    Ok(settings)
}

fn run<F, const N: usize>(
    field: F,
    preset: Config<N>,
    args: &Args,
    default_store: Option<PathBuf>,
) -> Result<()>
where
    F: VectorField<N>,
{
    let config = settings(args)?
        .apply(preset)
        .context("invalid configuration")?;
    let variables = field.variables();
    let mut experiment = Experiment::new(field, Solver::default(), config);

    let report = match args.store.clone().or(default_store) {
        Some(dir) => {
            log::info!("caching artifacts in {}", dir.display());
            experiment.with_storage(Directory::new(dir)).run()?
        }
        None => experiment.run()?,
    };

    print_report(&report, variables);
    Ok(())
}

fn print_report<const N: usize>(report: &Report<N>, variables: [&str; N]) {
    println!(
        "dataset: {:?}, model: {:?}, pairs: {} train / {} test",
        report.dataset, report.model, report.train_pairs, report.test_pairs
    );

    match report.metrics {
        Some(metrics) => {
            println!("Mean Squared Error: {}", metrics.mse);
            println!("Mean Absolute Error: {}", metrics.mae);
            println!("R² Score: {}", metrics.r2);
        }
        None => println!("No test trajectories to evaluate."),
    }

    if let Some(rollout) = &report.rollout {
        println!(
            "Rollout from test trajectory {} ({} states):",
            rollout.trajectory,
            rollout.states.len()
        );
        for (name, error) in variables.iter().zip(rollout.comparison.final_error) {
            println!("  final |error| in {name}: {error}");
        }
        if let Some(step) = rollout.comparison.first_non_finite {
            println!("  non-finite from step {step}");
        }
    }
}
