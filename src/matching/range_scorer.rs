// src/matching/range_scorer.rs - Scores one contiguous range of rows against all earlier rows
use log::debug;
use ndarray::Array2;
use std::ops::Range;

use crate::matching::similarity::combine;
use crate::matching::uen::UenColumn;
use crate::models::core::{ColumnPass, Dataset, PassWeights};

/// Scores for the rows a worker owns, one matrix row per owned row and one
/// column per dataset row.
///
/// Only the lower triangle (`k < i`) is ever written; the diagonal and the
/// upper triangle stay at zero so the aggregator can mirror by addition.
/// The other half of the rectangle is wasted memory, kept for simple indexing.
#[derive(Debug, Clone)]
pub struct ScoreSlab {
    pub range: Range<usize>,
    pub scores: Array2<f64>,
}

impl ScoreSlab {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.scores[[row - self.range.start, col]]
    }
}

pub struct RowRangeScorer {
    total_rows: usize,
    range: Range<usize>,
    scores: Array2<f64>,
}

impl RowRangeScorer {
    /// Every owned row `i` starts at 1 against each `k < i` and 0 elsewhere.
    /// With `sources`, pairs sharing a source start (and stay) at 0.
    pub fn new(total_rows: usize, range: Range<usize>, sources: Option<&[String]>) -> Self {
        assert!(
            range.start <= range.end && range.end <= total_rows,
            "row range {:?} outside 0..{}",
            range,
            total_rows
        );
        let start = range.start;
        let mut scores = Array2::from_shape_fn((range.len(), total_rows), |(local, k)| {
            if k < start + local {
                1.0
            } else {
                0.0
            }
        });

        if let Some(sources) = sources {
            for (local, mut row) in scores.rows_mut().into_iter().enumerate() {
                let i = start + local;
                for k in 0..i {
                    if sources[k] == sources[i] {
                        row[k] = 0.0;
                    }
                }
            }
        }

        Self {
            total_rows,
            range,
            scores,
        }
    }

    pub fn range(&self) -> &Range<usize> {
        &self.range
    }

    /// Folds one free-text column into every owned pair.
    pub fn process(&mut self, values: &[String], weights: PassWeights) {
        debug_assert_eq!(values.len(), self.total_rows);
        self.fold_pairs(|i, k, prior| combine(&values[i], &values[k], prior, weights));
    }

    /// Folds the registration code column into every owned pair.
    pub fn process_uen(&mut self, column: &UenColumn) {
        debug_assert_eq!(column.len(), self.total_rows);
        self.fold_pairs(|i, k, prior| column.combine_rows(i, k, prior));
    }

    pub fn process_pass(&mut self, pass: &ColumnPass) {
        match pass {
            ColumnPass::Text { values, weights, .. } => self.process(values, *weights),
            ColumnPass::Uen { column, .. } => self.process_uen(column),
        }
    }

    fn fold_pairs<F>(&mut self, mut score_pair: F)
    where
        F: FnMut(usize, usize, f64) -> f64,
    {
        let start = self.range.start;
        for (local, mut row) in self.scores.rows_mut().into_iter().enumerate() {
            let i = start + local;
            for k in 0..i {
                let prior = row[k];
                if prior == 0.0 {
                    continue;
                }
                row[k] = score_pair(i, k, prior);
            }
        }
    }

    pub fn into_slab(self) -> ScoreSlab {
        ScoreSlab {
            range: self.range,
            scores: self.scores,
        }
    }
}

/// Runs every pass of the dataset, in order, over one row range.
pub fn score_range(dataset: &Dataset, range: Range<usize>) -> ScoreSlab {
    let mut scorer = RowRangeScorer::new(dataset.row_count(), range, dataset.sources.as_deref());
    for pass in &dataset.passes {
        scorer.process_pass(pass);
        debug!("Rows {:?}: finished pass {:?}", scorer.range(), pass.label());
    }
    scorer.into_slab()
}
