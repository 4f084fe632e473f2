use anyhow::{Context, Result};
use beamline_common::{BeamlineConfig, ExecutionMode};
use beamline_sim::output::{output_path, write_events, write_final_ensemble_csv, write_summary_json};
use beamline_sim::{RandomSource, RunSummary, SimulationPipeline};
use clap::Parser;
use env_logger::Builder;
use log::{debug, info, LevelFilter};
use std::path::PathBuf;

/// Command-line arguments for the beamline driver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file (reference values are used if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed, overrides the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Number of simulated positrons, overrides the configuration
    #[arg(short, long)]
    num_particles: Option<usize>,

    /// Sample with per-particle random streams on the rayon thread pool
    #[arg(long)]
    parallel: bool,

    /// Directory for written results
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Info by default, RUST_LOG overrides.
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("Starting Beamline Monte Carlo...");

    // --- Load Configuration ---
    let mut config = match &args.config {
        Some(path) => BeamlineConfig::load(path)?,
        None => {
            info!("No config file given, using reference beamline parameters.");
            BeamlineConfig::default()
        }
    };
    if let Some(seed) = args.seed {
        config.run.seed = Some(seed);
    }
    if let Some(n) = args.num_particles {
        config.beam.num_particles = n;
    }
    if args.parallel {
        config.run.execution = ExecutionMode::Parallel;
        info!("Using {} Rayon threads.", rayon::current_num_threads());
    }

    // --- Run ---
    let pipeline = SimulationPipeline::new(config.clone())?;
    debug!("Run parameters: {:#?}", pipeline.params());
    let mut rng = RandomSource::from_config(&config);
    let output = pipeline.run(&mut rng)?;

    let summary = RunSummary::from_run(&output, &config);
    summary.log();

    // --- Save Results ---
    let out = &config.output;
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create output directory '{}'", args.output_dir.display()))?;

    if out.save_events {
        write_events(&args.output_dir, &out.base_filename, &output.cherenkov_events, out.format)?;
    } else {
        info!("Skipping saving Cherenkov events as per config.");
    }

    if out.save_final_ensemble {
        let path = output_path(&args.output_dir, &out.base_filename, "_final_ensemble.csv");
        write_final_ensemble_csv(&path, &output.final_ensemble)?;
    } else {
        info!("Skipping saving final ensemble as per config.");
    }

    if out.save_summary {
        let path = output_path(&args.output_dir, &out.base_filename, "_summary.json");
        write_summary_json(&path, &summary)?;
    }

    info!("Simulation Complete.");
    Ok(())
}
