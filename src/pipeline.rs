// src/pipeline.rs - Load, score, aggregate and write one table
use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::io::Table;
use crate::matching::manager::score_dataset;
use crate::matching::uen::UenColumn;
use crate::models::core::{ColumnKind, ColumnPass, Dataset};
use crate::models::stats_models::{PartitionStats, RunStats};
use crate::partition::planner::plan_partitions;
use crate::utils::dedupe_config::DedupeConfig;
use crate::utils::get_memory_usage;
use crate::utils::progress_bars::logging::ScoringLogger;
use crate::utils::progress_bars::progress_config::ProgressConfig;

/// Builds the scoring input from a loaded table.
pub fn build_dataset(table: &Table, config: &DedupeConfig) -> Result<Dataset> {
    let ids = table
        .column(config.id_column)
        .context("Failed to read id column")?;

    let sources = if config.source_filter.is_active() {
        let sources = table
            .column(config.source_column)
            .context("Failed to read source column")?;
        config.source_filter.inspect_sources(&sources);
        Some(sources)
    } else {
        None
    };

    let mut passes = Vec::with_capacity(config.columns.len());
    for spec in &config.columns {
        let values = table
            .column(spec.column_no)
            .with_context(|| format!("Failed to read {} column {}", spec.kind, spec.column_no))?;
        let label = table.header(spec.column_no);
        passes.push(match spec.kind {
            ColumnKind::Uen => ColumnPass::Uen {
                label,
                column: UenColumn::new(values),
            },
            ColumnKind::Text => ColumnPass::Text {
                label,
                values,
                weights: spec.weights,
            },
        });
    }

    Dataset::new(ids, sources, passes)
}

/// Scores every row of `input` and writes the table, plus a confidence
/// column, to `config.output_path`. Nothing is written if scoring fails.
pub async fn run_dedupe(input: &Path, config: &DedupeConfig) -> Result<RunStats> {
    let run_started = Instant::now();
    let run_id = Uuid::new_v4().to_string();
    let run_timestamp = Utc::now().naive_utc();
    let progress_config = ProgressConfig::from_env();
    let logger = ScoringLogger::new();

    config.validate()?;
    logger.log_start(&run_id, &input.display().to_string(), config.source_filter.is_active());

    logger.log_phase("Loading data", Some(input.display().to_string().as_str()));
    let table = Table::read_csv(input)?;
    let dataset = build_dataset(&table, config)?;
    logger.log_data_loaded(dataset.row_count(), dataset.passes.len());
    for pass in &dataset.passes {
        logger.log_debug(&format!("Column pass {:?}", pass.label()));
    }

    if progress_config.should_show_memory() {
        info!("Memory before scoring: {} MB", get_memory_usage().await);
    }

    logger.log_phase("Scoring", Some(format!("{} workers", config.workers).as_str()));
    let scoring_started = Instant::now();
    let total_rows = dataset.row_count();
    let matrix = score_dataset(
        Arc::new(dataset),
        config.workers,
        progress_config.create_progress_bar(),
    )
    .await
    .context("Failed to score rows")?;
    let scoring_seconds = scoring_started.elapsed().as_secs_f64();

    if progress_config.should_show_memory() {
        info!("Memory after scoring: {} MB", get_memory_usage().await);
    }

    let confidence = matrix.row_confidence();
    let total_score: f64 = confidence.iter().sum();
    let average_score = matrix.average_confidence();
    logger.log_completion(total_rows, total_score, average_score);

    logger.log_phase("Writing output", Some(config.output_path.display().to_string().as_str()));
    table.write_csv_with_scores(&config.output_path, &config.score_header, &confidence)?;

    Ok(RunStats {
        run_id,
        run_timestamp,
        input_path: input.display().to_string(),
        output_path: config.output_path.display().to_string(),
        ignore_same_source: config.source_filter.is_active(),
        total_rows,
        workers: config.workers,
        partitions: plan_partitions(total_rows, config.workers)
            .iter()
            .map(PartitionStats::from)
            .collect(),
        total_score,
        average_score,
        max_score: confidence.iter().copied().fold(0.0, f64::max),
        rows_above_one: confidence.iter().filter(|&&c| c > 1.0).count(),
        scoring_seconds,
        total_seconds: run_started.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::source_filter::SourceFilterConfig;
    use std::fs;
    use tempfile::tempdir;

    const INPUT: &str = "\
id,source,uen,name,street,postal
1,ACRA,201912345K,Acme Holdings Pte Ltd,1 Main St,123456
2,IRAS,201912345K,ACME HOLDINGS PTE. LTD.,1 Main St,123456
3,ACRA,53123400,Globex,77 Harbour Rd,NA
4,ACRA,T08LL1234A,Umbrella Corp,9 Queen Ave,
5,IRAS,None,Initech,#N/A,-
";

    fn config_for(dir: &Path, workers: usize, ignore_same_source: bool) -> DedupeConfig {
        DedupeConfig {
            workers,
            output_path: dir.join(format!("output_{}_{}.csv", workers, ignore_same_source)),
            source_filter: SourceFilterConfig::new(ignore_same_source),
            ..DedupeConfig::default()
        }
    }

    fn read_scores(path: &Path) -> Vec<f64> {
        let table = Table::read_csv(path).unwrap();
        let last = table.headers.len();
        assert_eq!(table.header(last), "Similarity Score");
        table
            .column(last)
            .unwrap()
            .iter()
            .map(|v| v.parse().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_run_dedupe_writes_scores() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        fs::write(&input, INPUT).unwrap();

        let config = config_for(dir.path(), 2, false);
        let stats = run_dedupe(&input, &config).await.unwrap();
        assert_eq!(stats.total_rows, 5);
        assert_eq!(stats.partitions.len(), 2);
        assert_eq!(stats.rows_above_one, 2);

        let scores = read_scores(&config.output_path);
        assert_eq!(scores.len(), 5);
        assert!(scores[0] > 1.0 && scores[0] == scores[1]);
        assert!(scores[0] > scores[2] && scores[0] > scores[3]);
        assert!((stats.average_score - scores.iter().sum::<f64>() / 5.0).abs() < 1e-9);

        let written = fs::read_to_string(&config.output_path).unwrap();
        assert!(written.starts_with("id,source,uen,name,street,postal,Similarity Score\n"));
        assert!(written.contains("1,ACRA,201912345K,Acme Holdings Pte Ltd,1 Main St,123456,"));
    }

    #[tokio::test]
    async fn test_run_dedupe_is_independent_of_workers() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        fs::write(&input, INPUT).unwrap();

        let one = config_for(dir.path(), 1, false);
        let four = config_for(dir.path(), 4, false);
        run_dedupe(&input, &one).await.unwrap();
        run_dedupe(&input, &four).await.unwrap();
        assert_eq!(read_scores(&one.output_path), read_scores(&four.output_path));
    }

    #[tokio::test]
    async fn test_same_source_rows_are_not_compared() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        fs::write(
            &input,
            "id,source,uen,name,street,postal\n\
             1,ACRA,201912345K,Acme,1 Main St,123456\n\
             2,ACRA,201912345K,Acme,1 Main St,123456\n",
        )
        .unwrap();

        let unfiltered = config_for(dir.path(), 1, false);
        run_dedupe(&input, &unfiltered).await.unwrap();
        assert!(read_scores(&unfiltered.output_path)[0] > 1.0);

        let filtered = config_for(dir.path(), 1, true);
        run_dedupe(&input, &filtered).await.unwrap();
        assert_eq!(read_scores(&filtered.output_path), vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_missing_column_fails_without_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        fs::write(&input, "id,source,uen\n1,ACRA,123\n").unwrap();

        let config = config_for(dir.path(), 1, false);
        assert!(run_dedupe(&input, &config).await.is_err());
        assert!(!config.output_path.exists());
    }
}
