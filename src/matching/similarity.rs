// src/matching/similarity.rs - Per-attribute similarity factor folded into a pair score
use strsim::normalized_levenshtein;

use crate::models::core::PassWeights;
use crate::utils::constants::{
    ABSENT_VALUES, EXACT_MATCH_FACTOR, LENGTH_SCALE_DIVISOR, PARTIAL_MATCH_BASE,
};

/// True for the sentinel strings that stand for a missing cell.
pub fn is_absent(value: &str) -> bool {
    ABSENT_VALUES.contains(&value)
}

/// Folds the comparison of `value` and `other` into `prior_score`.
///
/// The result is `prior_score * raw_factor ^ length_scale`, where
/// `length_scale` grows with the combined length of the two values and
/// `raw_factor` is 2 for identical values and `0.5 + similarity` for partial
/// matches. A zero prior stays zero, and absent values leave the prior
/// untouched. With `weight == 0` only identical values count.
pub fn combine(value: &str, other: &str, prior_score: f64, weights: PassWeights) -> f64 {
    if prior_score == 0.0 || is_absent(value) || is_absent(other) {
        return prior_score;
    }

    let mut length_scale =
        (value.chars().count() + other.chars().count()) as f64 / LENGTH_SCALE_DIVISOR;

    let raw_factor = if value == other {
        length_scale *= weights.exact_match_weight;
        EXACT_MATCH_FACTOR
    } else if weights.weight == 0.0 {
        return prior_score;
    } else {
        let similarity = normalized_levenshtein(value, other);
        if similarity < 1.0 {
            length_scale *= weights.weight.min(1.0);
            PARTIAL_MATCH_BASE + similarity
        } else {
            length_scale *= weights.weight;
            EXACT_MATCH_FACTOR * similarity
        }
    };

    prior_score * raw_factor.powf(length_scale)
}
