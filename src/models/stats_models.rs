// src/models/stats_models.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::partition::planner::pair_count;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartitionStats {
    pub start: usize,
    pub end: usize,
    pub pairs: u64,
}

impl From<&Range<usize>> for PartitionStats {
    fn from(range: &Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            pairs: pair_count(range),
        }
    }
}

/// Summary of one scoring run, written next to the output when requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    pub run_id: String,
    pub run_timestamp: NaiveDateTime,
    pub input_path: String,
    pub output_path: String,
    pub ignore_same_source: bool,
    pub total_rows: usize,
    pub workers: usize,
    pub partitions: Vec<PartitionStats>,
    pub total_score: f64,
    pub average_score: f64,
    pub max_score: f64,
    pub rows_above_one: usize,
    pub scoring_seconds: f64,
    pub total_seconds: f64,
}
