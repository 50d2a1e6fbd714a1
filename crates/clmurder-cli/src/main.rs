//! clmurder: generate a Command Line Murders mystery from a seed directory.
//!
//! Usage:
//!   clmurder                          # bundled seeds, random seed, report on stdout
//!   clmurder --seed 42 -o solution.json
//!   clmurder --config tuned.json --full --verbose

mod seed_dir;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use clmurder_logic::audit::audit_mystery;
use clmurder_logic::config::MysteryConfig;
use clmurder_logic::{generate_with_reseed, Mystery, MysteryReport};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "clmurder", version, about = "Generate a Command Line Murders mystery")]
struct Cli {
    /// Directory holding the seed lists
    #[arg(short = 'd', long, default_value = "data/seeds")]
    seed_dir: PathBuf,

    /// JSON file overriding generation parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed; a random one is drawn when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include the whole population and lookup indices
    #[arg(long)]
    full: bool,

    /// Log generation progress
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct FullOutput<'a> {
    report: &'a MysteryReport,
    mystery: &'a Mystery,
}

fn load_config(path: Option<&PathBuf>) -> Result<MysteryConfig> {
    let Some(path) = path else {
        return Ok(MysteryConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let seeds = seed_dir::load_seed_dir(&cli.seed_dir)?;
    let config = load_config(cli.config.as_ref())?;
    let base_seed = cli.seed.unwrap_or_else(rand::random);

    let (seed, mystery) = generate_with_reseed(&seeds, &config, base_seed)
        .with_context(|| format!("generating mystery from seed {base_seed}"))?;

    let findings = audit_mystery(&mystery, &config);
    if !findings.is_empty() {
        for finding in &findings {
            log::error!("Audit: {finding}");
        }
        bail!("generated mystery failed {} audit check(s)", findings.len());
    }

    let report = mystery.report(seed);
    log::info!(
        "Seed {seed}: culprit {} ({}), witness {} ({})",
        report.culprit.name,
        report.culprit.vehicle.tag,
        report.witness.name,
        report.witness.id
    );

    let json = if cli.full {
        serde_json::to_string_pretty(&FullOutput {
            report: &report,
            mystery: &mystery,
        })?
    } else {
        serde_json::to_string_pretty(&report)?
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, json + "\n")
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
