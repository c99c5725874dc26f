// src/utils/progress_bars/logging.rs - Logging helpers for scoring runs
use log::{debug, info, warn};
use std::ops::Range;
use std::time::Instant;

use crate::partition::planner::{imbalance, pair_count};

#[derive(Clone)]
pub struct ScoringLogger {
    stage_name: &'static str,
    stage_emoji: &'static str,
    start_time: Instant,
}

impl Default for ScoringLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringLogger {
    pub fn new() -> Self {
        Self::for_stage("SCORING", "🧮")
    }

    pub fn for_stage(stage_name: &'static str, stage_emoji: &'static str) -> Self {
        Self {
            stage_name,
            stage_emoji,
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, run_id: &str, input: &str, ignore_same_source: bool) {
        info!(
            "[{}] {} 🚀 Starting duplicate scoring of {} (run ID: {}){}",
            self.stage_name,
            self.stage_emoji,
            input,
            run_id,
            if ignore_same_source { " ignoring same-source pairs" } else { "" }
        );
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        let msg = if let Some(details) = details {
            format!(
                "[{}] {} 🔄 Phase: {} - {} [+{:.1}s]",
                self.stage_name, self.stage_emoji, phase, details, elapsed.as_secs_f32()
            )
        } else {
            format!(
                "[{}] {} 🔄 Phase: {} [+{:.1}s]",
                self.stage_name, self.stage_emoji, phase, elapsed.as_secs_f32()
            )
        };
        info!("{}", msg);
    }

    pub fn log_data_loaded(&self, rows: usize, columns: usize) {
        if rows == 0 {
            warn!(
                "[{}] {} ⚠️  Input has no data rows; every score will be empty",
                self.stage_name, self.stage_emoji
            );
        }
        info!(
            "[{}] {} 📊 Loaded {} rows with {} compared columns ({} pairs)",
            self.stage_name,
            self.stage_emoji,
            rows,
            columns,
            pair_count(&(0..rows))
        );
    }

    pub fn log_partition_plan(&self, ranges: &[Range<usize>]) {
        info!(
            "[{}] {} 📦 {} partitions planned (imbalance {:.3})",
            self.stage_name,
            self.stage_emoji,
            ranges.len(),
            imbalance(ranges)
        );
        for (idx, range) in ranges.iter().enumerate() {
            debug!(
                "[{}] partition {}: rows {:?} ({} rows, {} pairs)",
                self.stage_name,
                idx,
                range,
                range.len(),
                pair_count(range)
            );
        }
    }

    pub fn log_completion(&self, rows: usize, total_score: f64, average_score: f64) {
        let duration = self.start_time.elapsed();
        info!(
            "[{}] {} 🎉 COMPLETED: scored {} rows in {:.2?}",
            self.stage_name, self.stage_emoji, rows, duration
        );
        info!(
            "[{}] {} 📊 Total score is {:.4} for {} rows (average {:.4})",
            self.stage_name, self.stage_emoji, total_score, rows, average_score
        );
    }

    pub fn log_debug(&self, message: &str) {
        debug!("[{}] {} {}", self.stage_name, self.stage_emoji, message);
    }
}
