use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use tabular_charts::artifacts::write_artifacts;
use tabular_charts::data::loader::load_file;
use tabular_charts::job::Job;
use tabular_charts::pipeline::run;

/// Build chart-ready JSON aggregates from a tabular file.
#[derive(Debug, Parser)]
#[command(name = "tabular-charts", version, about)]
struct Cli {
    /// Data file (.csv, .json, .parquet, .xlsx, .xls, .ods).
    #[arg(short, long)]
    input: PathBuf,

    /// Job file with the column types and chart requests.
    #[arg(short, long)]
    job: PathBuf,

    /// Directory receiving one `<artifact>.json` per chart.
    #[arg(short, long, default_value = "charts")]
    out_dir: PathBuf,

    /// Language for word frequencies (turkish, english); overrides the job.
    #[arg(long)]
    language: Option<String>,

    /// Stem words in word frequencies; overrides the job.
    #[arg(long)]
    stem: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut job = Job::from_path(&cli.job)
        .with_context(|| format!("reading job {}", cli.job.display()))?;
    if let Some(language) = &cli.language {
        job.set_language(language)?;
    }
    if cli.stem {
        job.stem = true;
    }

    let dataset = load_file(&cli.input)?;
    let batch = run(&dataset, &job).context("building charts")?;

    for skipped in &batch.skipped {
        warn!("chart #{} skipped: {}", skipped.index, skipped.reason);
    }
    let paths = write_artifacts(&cli.out_dir, &batch.payloads)?;
    info!("wrote {} artifacts to {}", paths.len(), cli.out_dir.display());
    for path in paths {
        println!("{}", path.display());
    }
    Ok(())
}
