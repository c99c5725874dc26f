// src/matching/uen.rs - Registration code normalization and comparison
use once_cell::sync::Lazy;
use regex::Regex;

use crate::matching::similarity::combine;
use crate::models::core::PassWeights;
use crate::utils::constants::{
    UEN_RAW_EXACT_MATCH_WEIGHT, UEN_RAW_WEIGHT, UEN_STRIPPED_EXACT_MATCH_WEIGHT,
    UEN_STRIPPED_WEIGHT,
};

static LEADING_ALPHA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Alphabetic}+").expect("leading alpha pattern is valid"));
static LEADING_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[09]+").expect("leading placeholder pattern is valid"));
static TRAILING_ZEROS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"0{2,}$").expect("trailing zeros pattern is valid"));

const STRIPPED: PassWeights = PassWeights {
    weight: UEN_STRIPPED_WEIGHT,
    exact_match_weight: UEN_STRIPPED_EXACT_MATCH_WEIGHT,
};
const RAW: PassWeights = PassWeights {
    weight: UEN_RAW_WEIGHT,
    exact_match_weight: UEN_RAW_EXACT_MATCH_WEIGHT,
};

/// Reduces a registration code to its significant digits: drops symbols and
/// spaces, an alphabetic prefix, a leading run of 0s and 9s, and a trailing
/// run of two or more 0s.
pub fn strip_uen(value: &str) -> String {
    let alnum: String = value.chars().filter(|c| c.is_alphanumeric()).collect();
    let stripped = LEADING_ALPHA.replace(&alnum, "");
    let stripped = LEADING_PLACEHOLDER.replace(&stripped, "");
    TRAILING_ZEROS.replace(&stripped, "").into_owned()
}

/// Scores one pair of registration codes: the better of the normalized
/// comparison and the raw exact-match comparison.
pub fn combine_uen(
    value: &str,
    other: &str,
    stripped_value: &str,
    stripped_other: &str,
    prior_score: f64,
) -> f64 {
    let stripped = combine(stripped_value, stripped_other, prior_score, STRIPPED);
    let raw = combine(value, other, prior_score, RAW);
    stripped.max(raw)
}

/// A registration code column with its normalized form computed once.
#[derive(Debug, Clone)]
pub struct UenColumn {
    pub raw: Vec<String>,
    pub stripped: Vec<String>,
}

impl UenColumn {
    pub fn new(raw: Vec<String>) -> Self {
        let stripped = raw.iter().map(|v| strip_uen(v)).collect();
        Self { raw, stripped }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Folds the comparison of rows `i` and `k` into `prior_score`.
    pub fn combine_rows(&self, i: usize, k: usize, prior_score: f64) -> f64 {
        combine_uen(
            &self.raw[i],
            &self.raw[k],
            &self.stripped[i],
            &self.stripped[k],
            prior_score,
        )
    }
}
