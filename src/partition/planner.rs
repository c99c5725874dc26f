// src/partition/planner.rs - Splits the triangular pair space into balanced row ranges
use std::ops::Range;

/// Number of pairs a row range owns: row `r` is compared with the `r` rows before it.
pub fn pair_count(range: &Range<usize>) -> u64 {
    if range.is_empty() {
        return 0;
    }
    let (start, end) = (range.start as u64, range.end as u64);
    (start + end - 1) * (end - start) / 2
}

/// Returns exactly `workers` contiguous half-open ranges covering `0..total_rows`
/// whose pair counts are close to `total_rows² / (2 * workers)` each.
///
/// Rows are walked upward and a range is closed as soon as its running pair
/// count reaches the target; the last range takes whatever is left. When the
/// rows run out early the remaining ranges are empty (`total_rows..total_rows`).
/// Zero workers is treated as one.
pub fn plan_partitions(total_rows: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let mut ranges = Vec::with_capacity(workers);

    // Compare `acc * 2 * workers >= n²` to stay in integers.
    let target = (total_rows as u128) * (total_rows as u128);
    let scale = 2 * workers as u128;

    let mut start = 0;
    let mut acc: u128 = 0;
    for row in 0..total_rows {
        if ranges.len() == workers - 1 {
            break;
        }
        acc += row as u128;
        if acc * scale >= target {
            ranges.push(start..row + 1);
            start = row + 1;
            acc = 0;
        }
    }

    ranges.push(start..total_rows);
    while ranges.len() < workers {
        ranges.push(total_rows..total_rows);
    }
    ranges
}

/// Ratio of the largest to the mean pair count; 1.0 is a perfect split.
pub fn imbalance(ranges: &[Range<usize>]) -> f64 {
    let counts: Vec<u64> = ranges.iter().map(pair_count).collect();
    let total: u64 = counts.iter().sum();
    if total == 0 || counts.is_empty() {
        return 1.0;
    }
    let mean = total as f64 / counts.len() as f64;
    counts.iter().copied().max().unwrap_or(0) as f64 / mean
}
