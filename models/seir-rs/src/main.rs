use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use log::{LevelFilter, info};
use seir::{CSV_HEADERS, ModelParameters, PoissonSampler, RunManifest, run_simulation};
use seir_run::Environment;

const OUTPUT_FILE: &str = "seir_output.csv";
const MANIFEST_FILE: &str = "run_manifest.json";

/// Simulates an outbreak with a stochastic SEIR tau-leap model.
///
/// The run envelope (`input`, `output`, `model` sections) is read from
/// `--config` or, without it, as JSON from stdin.
#[derive(Parser, Debug)]
#[command(name = "seir", version, about)]
struct Args {
    /// Run envelope file, TOML or JSON.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write outputs to this directory instead of the envelope's output.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// One of off, error, warn, info, debug, trace.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level: LevelFilter = args
        .log_level
        .parse()
        .map_err(|_| anyhow!("unknown log level '{}'", args.log_level))?;
    seir_run::logging::init(level)?;

    let envelope = match &args.config {
        Some(path) => Environment::from_config_file(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => Environment::from_stdin().context("failed to read run envelope from stdin")?,
    };
    let mut env = envelope
        .with_input_type::<ModelParameters>()
        .context("invalid model parameters")?;
    if let Some(dir) = &args.output_dir {
        env.set_output_dir(dir);
    }

    let parameters = env.input()?.clone();
    let warnings = parameters.validate()?;
    info!(
        "replicate {} with seed {}: population {}, R0 {:.2}",
        env.replicate,
        env.seed,
        parameters.population,
        parameters.basic_reproduction_number()
    );

    let mut sampler = PoissonSampler::seed_from_u64(env.seed);
    let trajectory = run_simulation(&parameters, &mut sampler)?;

    env.write_csv(OUTPUT_FILE, &CSV_HEADERS, &trajectory.rows())?;

    if env.output_dir().is_some() {
        let manifest = RunManifest {
            parameters: &parameters,
            seed: env.seed,
            replicate: env.replicate,
            fingerprint: seir_run::fingerprint(&parameters, env.seed)?,
            summary: trajectory.summary(),
            warnings: &warnings,
        };
        env.write_json(MANIFEST_FILE, &manifest)?;
    }
    Ok(())
}
