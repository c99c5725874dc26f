// src/aggregation/aggregator.rs - Merges worker slabs into one symmetric score matrix
use anyhow::{bail, Context, Result};
use ndarray::{concatenate, Array2, ArrayView2, Axis};

use crate::matching::range_scorer::ScoreSlab;

/// Full symmetric score matrix with a zero diagonal.
#[derive(Debug, Clone)]
pub struct ScoreMatrix {
    scores: Array2<f64>,
}

impl ScoreMatrix {
    pub fn size(&self) -> usize {
        self.scores.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.scores[[i, j]]
    }

    pub fn scores(&self) -> &Array2<f64> {
        &self.scores
    }

    /// Per-row maximum over all other rows: the row's duplicate confidence.
    pub fn row_confidence(&self) -> Vec<f64> {
        self.scores
            .rows()
            .into_iter()
            .map(|row| row.iter().copied().fold(0.0, f64::max))
            .collect()
    }

    /// Sum of the row confidences divided by the row count (0 for an empty table).
    pub fn average_confidence(&self) -> f64 {
        let n = self.size();
        if n == 0 {
            return 0.0;
        }
        self.row_confidence().iter().sum::<f64>() / n as f64
    }
}

/// Concatenates the slabs (in partition order) into an N×N matrix and adds
/// its transpose. Each slab only holds its strictly lower triangle, so the
/// addition fills both halves exactly once and leaves the diagonal at 0.
pub fn aggregate(slabs: Vec<ScoreSlab>, total_rows: usize) -> Result<ScoreMatrix> {
    let mut expected_start = 0;
    for slab in &slabs {
        if slab.range.start != expected_start {
            bail!(
                "Slab for rows {:?} does not start at row {}",
                slab.range,
                expected_start
            );
        }
        if slab.scores.dim() != (slab.range.len(), total_rows) {
            bail!(
                "Slab for rows {:?} has shape {:?}, expected ({}, {})",
                slab.range,
                slab.scores.dim(),
                slab.range.len(),
                total_rows
            );
        }
        expected_start = slab.range.end;
    }
    if expected_start != total_rows {
        bail!("Slabs cover rows 0..{} but the table has {} rows", expected_start, total_rows);
    }

    let lower = if total_rows == 0 {
        Array2::zeros((0, 0))
    } else {
        let views: Vec<ArrayView2<f64>> = slabs.iter().map(|s| s.scores.view()).collect();
        concatenate(Axis(0), &views).context("Failed to concatenate score slabs")?
    };

    let scores = &lower + &lower.t();
    Ok(ScoreMatrix { scores })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn slab(range: std::ops::Range<usize>, scores: Array2<f64>) -> ScoreSlab {
        ScoreSlab { range, scores }
    }

    #[test]
    fn test_aggregate_mirrors_lower_triangle() {
        let slabs = vec![
            slab(0..2, array![[0.0, 0.0, 0.0], [1.5, 0.0, 0.0]]),
            slab(2..3, array![[0.7, 3.0, 0.0]]),
        ];
        let matrix = aggregate(slabs, 3).unwrap();

        assert_eq!(matrix.size(), 3);
        for i in 0..3 {
            assert_eq!(matrix.get(i, i), 0.0);
            for j in 0..3 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
        assert_eq!(matrix.get(0, 1), 1.5);
        assert_eq!(matrix.get(1, 2), 3.0);
        assert_eq!(matrix.row_confidence(), vec![1.5, 3.0, 3.0]);
        assert!((matrix.average_confidence() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_accepts_empty_trailing_slabs() {
        let slabs = vec![
            slab(0..2, array![[0.0, 0.0], [2.0, 0.0]]),
            slab(2..2, Array2::zeros((0, 2))),
        ];
        let matrix = aggregate(slabs, 2).unwrap();
        assert_eq!(matrix.row_confidence(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_aggregate_rejects_gaps_and_short_coverage() {
        let gap = vec![
            slab(0..1, Array2::zeros((1, 3))),
            slab(2..3, Array2::zeros((1, 3))),
        ];
        assert!(aggregate(gap, 3).is_err());

        let short = vec![slab(0..2, Array2::zeros((2, 3)))];
        assert!(aggregate(short, 3).is_err());

        let misshapen = vec![slab(0..2, Array2::zeros((2, 2)))];
        assert!(aggregate(misshapen, 3).is_err());
    }

    #[test]
    fn test_empty_table() {
        let matrix = aggregate(vec![slab(0..0, Array2::zeros((0, 0)))], 0).unwrap();
        assert_eq!(matrix.size(), 0);
        assert!(matrix.row_confidence().is_empty());
        assert_eq!(matrix.average_confidence(), 0.0);
    }

    #[test]
    fn test_single_row_scores_zero() {
        let matrix = aggregate(vec![slab(0..1, Array2::zeros((1, 1)))], 1).unwrap();
        assert_eq!(matrix.row_confidence(), vec![0.0]);
    }
}
