// src/matching/manager.rs - Fans row ranges out to blocking workers and joins the slabs
use anyhow::{anyhow, Context, Result};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use crate::aggregation::{aggregate, ScoreMatrix};
use crate::matching::range_scorer::{score_range, ScoreSlab};
use crate::models::core::Dataset;
use crate::partition::planner::plan_partitions;
use crate::utils::progress_bars::logging::ScoringLogger;

/// Default worker count: one per core, keeping one back for coordination and I/O.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

/// Scores every pair of the dataset using `workers` parallel row ranges.
///
/// Each range is scored on tokio's blocking pool and returned by value;
/// slabs are aggregated once all workers are done. Any worker failure
/// fails the whole run. The result does not depend on `workers`.
pub async fn score_dataset(
    dataset: Arc<Dataset>,
    workers: usize,
    progress: Option<ProgressBar>,
) -> Result<ScoreMatrix> {
    let total_rows = dataset.row_count();
    let logger = ScoringLogger::new();
    let ranges = plan_partitions(total_rows, workers);
    logger.log_partition_plan(&ranges);

    let active: Vec<Range<usize>> = ranges.iter().filter(|r| !r.is_empty()).cloned().collect();

    if let Some(pb) = &progress {
        pb.set_length(active.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  🧮 [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb.set_message("Scoring partitions...");
    }

    let tasks: Vec<JoinHandle<ScoreSlab>> = active
        .iter()
        .cloned()
        .map(|range| {
            let dataset = Arc::clone(&dataset);
            tokio::task::spawn_blocking(move || {
                let started = Instant::now();
                let slab = score_range(&dataset, range.clone());
                debug!("Scored rows {:?} in {:.2?}", range, started.elapsed());
                slab
            })
        })
        .collect();

    let results = join_all(tasks.into_iter().zip(active.iter().cloned()).map(
        |(task, range)| {
            let pb = progress.clone();
            async move {
                let result = task.await;
                if let Some(pb) = pb {
                    pb.inc(1);
                }
                result.map_err(|e| anyhow!("Worker for rows {:?} failed: {}", range, e))
            }
        },
    ))
    .await;

    let slabs = results
        .into_iter()
        .collect::<Result<Vec<ScoreSlab>>>()
        .context("Scoring aborted")?;

    if let Some(pb) = &progress {
        pb.finish_with_message("Partitions scored");
    }

    logger.log_phase("Aggregating", Some(format!("{} slabs", slabs.len()).as_str()));
    let matrix = aggregate(slabs, total_rows)?;
    info!(
        "[SCORING] 🧮 Aggregated {}x{} score matrix",
        matrix.size(),
        matrix.size()
    );
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::uen::UenColumn;
    use crate::models::core::{ColumnPass, PassWeights};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn text_pass(label: &str, values: Vec<String>, weights: PassWeights) -> ColumnPass {
        ColumnPass::Text {
            label: label.to_string(),
            values,
            weights,
        }
    }

    fn synthetic_dataset(rows: usize, seed: u64, sources: bool) -> Dataset {
        let mut rng = StdRng::seed_from_u64(seed);
        let words = ["ACME", "GLOBEX", "INITECH", "UMBRELLA", "HOOLI", "PTE", "LTD", "HOLDINGS"];
        let pick_name = |rng: &mut StdRng| {
            let count = rng.gen_range(1..4);
            (0..count)
                .map(|_| words[rng.gen_range(0..words.len())])
                .collect::<Vec<_>>()
                .join(" ")
        };

        let ids = (0..rows).map(|i| format!("ID{}", i)).collect();
        let codes = (0..rows)
            .map(|_| format!("{}{:05}", ["", "T", "00"][rng.gen_range(0..3)], rng.gen_range(0..50)))
            .collect();
        let names = (0..rows).map(|_| pick_name(&mut rng)).collect();
        let streets = (0..rows)
            .map(|_| {
                if rng.gen_bool(0.2) {
                    "NA".to_string()
                } else {
                    format!("{} MAIN ST", rng.gen_range(1..20))
                }
            })
            .collect();
        let source_tags = if sources {
            Some((0..rows).map(|_| ["ACRA", "IRAS", "CRM"][rng.gen_range(0..3)].to_string()).collect())
        } else {
            None
        };

        Dataset::new(
            ids,
            source_tags,
            vec![
                ColumnPass::Uen {
                    label: "uen".to_string(),
                    column: UenColumn::new(codes),
                },
                text_pass("name", names, PassWeights::default()),
                text_pass("street", streets, PassWeights::new(0.5)),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_worker_count_does_not_change_scores() {
        let dataset = Arc::new(synthetic_dataset(120, 7, false));
        let single = score_dataset(Arc::clone(&dataset), 1, None).await.unwrap();
        let four = score_dataset(Arc::clone(&dataset), 4, None).await.unwrap();
        let many = score_dataset(dataset, 13, None).await.unwrap();

        assert_eq!(single.scores(), four.scores());
        assert_eq!(single.scores(), many.scores());
        assert_eq!(single.row_confidence(), four.row_confidence());
    }

    #[tokio::test]
    async fn test_matrix_invariants() {
        let dataset = Arc::new(synthetic_dataset(60, 11, true));
        let matrix = score_dataset(Arc::clone(&dataset), 3, None).await.unwrap();
        let sources = dataset.sources.as_ref().unwrap();

        for i in 0..60 {
            assert_eq!(matrix.get(i, i), 0.0);
            for j in 0..60 {
                let score = matrix.get(i, j);
                assert!(score >= 0.0);
                assert_eq!(score, matrix.get(j, i));
                if i != j && sources[i] == sources[j] {
                    assert_eq!(score, 0.0, "same-source pair ({}, {}) scored", i, j);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_exact_duplicate_outscores_distinct_pair() {
        let dataset = Dataset::new(
            strings(&["1", "2", "3", "4"]),
            Some(strings(&["ACRA", "IRAS", "ACRA", "IRAS"])),
            vec![
                ColumnPass::Uen {
                    label: "uen".to_string(),
                    column: UenColumn::new(strings(&["201912345K", "201912345K", "53123400", "T08LL1234A"])),
                },
                text_pass(
                    "name",
                    strings(&["ACME HOLDINGS PTE LTD", "ACME HOLDINGS PTE LTD", "GLOBEX", "UMBRELLA CORP"]),
                    PassWeights::default(),
                ),
                text_pass(
                    "street",
                    strings(&["1 MAIN ST", "1 MAIN ST", "77 HARBOUR RD", "9 QUEEN AVE"]),
                    PassWeights::default(),
                ),
            ],
        )
        .unwrap();

        let matrix = score_dataset(Arc::new(dataset), 2, None).await.unwrap();
        let confidence = matrix.row_confidence();
        assert!(matrix.get(0, 1) > matrix.get(2, 3));
        assert!(confidence[0] > confidence[2]);
        assert!(confidence[1] > confidence[3]);
        assert!(confidence[0] > 1.0);
    }

    #[tokio::test]
    async fn test_zero_stays_zero_across_passes() {
        let dataset = Dataset::new(
            strings(&["1", "2"]),
            Some(strings(&["ACRA", "ACRA"])),
            vec![
                ColumnPass::Uen {
                    label: "uen".to_string(),
                    column: UenColumn::new(strings(&["12345", "12345"])),
                },
                text_pass("name", strings(&["ACME", "ACME"]), PassWeights::default()),
            ],
        )
        .unwrap();
        let matrix = score_dataset(Arc::new(dataset), 2, None).await.unwrap();
        assert_eq!(matrix.row_confidence(), vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_empty_dataset() {
        let dataset = Dataset::new(
            Vec::new(),
            None,
            vec![ColumnPass::Uen {
                label: "uen".to_string(),
                column: UenColumn::new(Vec::new()),
            }],
        )
        .unwrap();
        let matrix = score_dataset(Arc::new(dataset), 4, None).await.unwrap();
        assert_eq!(matrix.size(), 0);
    }

    #[test]
    fn test_default_worker_count_is_positive() {
        assert!(default_worker_count() >= 1);
    }
}
