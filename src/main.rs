use anyhow::{Context, Result};
use clap::Parser;
use dedupe_lib::models::core::parse_column_specs;
use dedupe_lib::run_dedupe;
use dedupe_lib::utils::dedupe_config::DedupeConfig;
use dedupe_lib::utils::env::load_env;
use dedupe_lib::utils::source_filter::SourceFilterConfig;
use log::info;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct DedupeArgs {
    /// CSV file to score (header row, id in the first column)
    input: PathBuf,

    /// Where to write the scored table
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Never compare rows that share a source tag
    #[arg(long)]
    ignore_same_source: bool,

    /// Number of parallel workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Compared columns, e.g. "uen:3,text:4,text:5,text:6:0.5:0.5"
    #[arg(long)]
    columns: Option<String>,

    /// Also write the run summary as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging and environment
    env_logger::init();
    load_env();
    let args = DedupeArgs::parse();

    let mut config = DedupeConfig::from_env().context("Failed to load configuration")?;
    if let Some(output) = args.output {
        config.output_path = output;
    }
    if args.ignore_same_source {
        config.source_filter = SourceFilterConfig::new(true);
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(columns) = args.columns.as_deref() {
        config.columns = parse_column_specs(columns).context("Invalid --columns")?;
    }
    config.validate()?;
    config.log_config();

    let stats = run_dedupe(&args.input, &config).await?;

    info!("=== Run Summary ===");
    info!("Run ID: {}", stats.run_id);
    info!("Rows scored: {}", stats.total_rows);
    info!("Rows above neutral score: {}", stats.rows_above_one);
    info!("Highest row score: {:.4}", stats.max_score);
    info!("Average row score: {:.4}", stats.average_score);
    info!("Scoring time: {:.2}s", stats.scoring_seconds);
    info!("Total execution time: {:.2}s", stats.total_seconds);

    if let Some(path) = args.summary_json {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialize run summary")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write run summary to {}", path.display()))?;
        info!("Run summary written to {}", path.display());
    }

    info!("Scored table written to {}", stats.output_path);
    Ok(())
}
